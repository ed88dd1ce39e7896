pub mod config;
pub mod creator;
pub mod dates;
pub mod error;
pub mod ranking;
pub mod scoring;
pub mod tables;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;
use crate::ranking::Ranker;
use crate::scoring::RequestStrategy;

pub use crate::error::PricingError;
pub use crate::scoring::{PricingEngine, PricingInput, StrategyKind, ThemeRequest, ViewSample};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum ContentType {
    Story,
    Reel,
    Post,
    Contest,
    Other,
}

impl ContentType {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "story" | "stories" => ContentType::Story,
            "reel" | "reels" | "video" => ContentType::Reel,
            "post" | "posts" | "photo" | "carousel" => ContentType::Post,
            "contest" | "giveaway" | "concours" => ContentType::Contest,
            _ => ContentType::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ContentType::Story => "STORY",
            ContentType::Reel => "REEL",
            ContentType::Post => "POST",
            ContentType::Contest => "CONTEST",
            ContentType::Other => "OTHER",
        }
    }

    pub fn base_cpm(self) -> f64 {
        match self {
            ContentType::Story => 8.0,
            ContentType::Reel => 9.0,
            ContentType::Post => 12.0,
            ContentType::Contest => 15.0,
            ContentType::Other => 10.0,
        }
    }

    pub fn base_conversion_rate(self) -> f64 {
        match self {
            ContentType::Story => 0.005,
            ContentType::Post => 0.008,
            ContentType::Reel => 0.01,
            ContentType::Contest => 0.015,
            ContentType::Other => 0.008,
        }
    }

    pub fn target_cpa(self) -> f64 {
        match self {
            ContentType::Story => 1.8,
            ContentType::Post => 2.5,
            ContentType::Reel => 2.8,
            ContentType::Contest => 3.5,
            ContentType::Other => 2.5,
        }
    }
}

impl From<String> for ContentType {
    fn from(value: String) -> Self {
        ContentType::parse(&value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum UsageRights {
    #[default]
    Standard,
    Extended,
    Unlimited,
}

impl UsageRights {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "extended" => UsageRights::Extended,
            "unlimited" => UsageRights::Unlimited,
            _ => UsageRights::Standard,
        }
    }

    pub fn factor(self) -> f64 {
        match self {
            UsageRights::Standard => 1.0,
            UsageRights::Extended => 1.2,
            UsageRights::Unlimited => 1.5,
        }
    }
}

impl From<String> for UsageRights {
    fn from(value: String) -> Self {
        UsageRights::parse(&value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum Exclusivity {
    #[default]
    None,
    Category,
    Industry,
}

impl Exclusivity {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "category" => Exclusivity::Category,
            "industry" => Exclusivity::Industry,
            _ => Exclusivity::None,
        }
    }

    pub fn factor(self) -> f64 {
        match self {
            Exclusivity::None => 1.0,
            Exclusivity::Category => 1.25,
            Exclusivity::Industry => 1.5,
        }
    }
}

impl From<String> for Exclusivity {
    fn from(value: String) -> Self {
        Exclusivity::parse(&value)
    }
}

/// One published post with its observed performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostStat {
    #[serde(default)]
    pub reach: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub saves: u64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub new_followers: u64,
    #[serde(default)]
    pub profile_visits: u64,
    #[serde(default)]
    pub interacting_accounts: u64,
    pub content_type: ContentType,
    #[serde(with = "crate::dates")]
    pub date: NaiveDate,
}

impl PostStat {
    pub fn interactions(&self) -> u64 {
        self.likes
            .saturating_add(self.comments)
            .saturating_add(self.saves)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRequest {
    pub content_type: ContentType,
    #[serde(default)]
    pub niche_category: String,
    #[serde(default)]
    pub destination: String,
    #[serde(with = "crate::dates")]
    pub publish_date: NaiveDate,
    #[serde(rename = "cmpWeight", alias = "cpmWeight", default = "default_cpm_weight")]
    pub cpm_weight: f64,
    #[serde(default = "default_cpa_weight")]
    pub cpa_weight: f64,
    #[serde(default)]
    pub usage_rights: UsageRights,
    #[serde(default)]
    pub exclusivity: Exclusivity,
    /// Audience size for the CPM audience tier; estimated from history when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<u64>,
}

impl PricingRequest {
    pub fn new(content_type: ContentType, publish_date: NaiveDate) -> Self {
        Self {
            content_type,
            niche_category: String::new(),
            destination: String::new(),
            publish_date,
            cpm_weight: default_cpm_weight(),
            cpa_weight: default_cpa_weight(),
            usage_rights: UsageRights::Standard,
            exclusivity: Exclusivity::None,
            followers: None,
        }
    }
}

fn default_cpm_weight() -> f64 {
    0.7
}

fn default_cpa_weight() -> f64 {
    0.3
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    pub estimated_views: u64,
    pub applied_cpm: f64,
    pub base_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub confidence: f64,
    pub strategy: StrategyKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignBrief {
    #[serde(default)]
    pub age_range: Option<[u32; 2]>,
    #[serde(default)]
    pub target_gender: Option<String>,
    #[serde(default)]
    pub min_engagement_rate: f64,
    #[serde(default)]
    pub min_reach: u64,
    pub max_budget: f64,
    #[serde(default)]
    pub campaign_goal: String,
    #[serde(default)]
    pub niche_category: String,
    pub content_type: ContentType,
    #[serde(with = "crate::dates")]
    pub publish_date: NaiveDate,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub usage_rights: UsageRights,
    #[serde(default)]
    pub exclusivity: Exclusivity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorProfile {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub niche_category: String,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub posts: Vec<PostStat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCreator {
    pub influencer: String,
    pub estimated_price: f64,
    pub estimated_views: u64,
    pub confidence: f64,
}

/// Prices a sponsored post from a creator's history with the default tables.
pub fn calculate_price(history: &[PostStat], request: &PricingRequest) -> PricingResult {
    calculate_price_with_config(history, request, &PricingConfig::default())
}

pub fn calculate_price_with_config(
    history: &[PostStat],
    request: &PricingRequest,
    config: &PricingConfig,
) -> PricingResult {
    RequestStrategy::from_config(config).quote(history, request)
}

/// Ranks a creator pool against a campaign brief with the default tables.
pub fn recommend_influencers_for_brief(
    brief: &CampaignBrief,
    pool: &[CreatorProfile],
) -> Vec<RankedCreator> {
    Ranker::from_config(&PricingConfig::default()).rank(brief, pool)
}

pub(crate) fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn population_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let center = mean(values);
    let variance = values
        .iter()
        .map(|value| (value - center).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

pub(crate) fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

pub(crate) fn non_negative(value: f64) -> f64 {
    if value.is_nan() || value.is_sign_negative() {
        0.0
    } else {
        value
    }
}

pub fn format_number(value: f64) -> String {
    let rounded = value.round().max(0.0) as i64;
    let mut chars: Vec<char> = rounded.to_string().chars().collect();
    let mut result = String::new();
    let mut count = 0usize;

    while let Some(ch) = chars.pop() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(ch);
        count += 1;
    }

    result.chars().rev().collect()
}

pub fn format_money(value: f64) -> String {
    let total_cents = (value * 100.0).round().max(0.0);
    let whole = format_number((total_cents / 100.0).trunc());
    let cents = (total_cents % 100.0) as u64;
    format!("{}.{:02}", whole, cents)
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_parsing_degrades_to_other() {
        assert_eq!(ContentType::parse("reels"), ContentType::Reel);
        assert_eq!(ContentType::parse("STORY"), ContentType::Story);
        assert_eq!(ContentType::parse("hologram"), ContentType::Other);
        assert_eq!(ContentType::Other.base_cpm(), 10.0);
    }

    #[test]
    fn enums_deserialize_case_insensitively() {
        let request: PricingRequest = serde_json::from_str(
            r#"{"contentType":"reel","publishDate":"2025-03-01","usageRights":"extended","exclusivity":"Category"}"#,
        )
        .expect("parse");
        assert_eq!(request.content_type, ContentType::Reel);
        assert_eq!(request.usage_rights, UsageRights::Extended);
        assert_eq!(request.exclusivity, Exclusivity::Category);
        assert_eq!(request.cpm_weight, 0.7);
        assert_eq!(request.cpa_weight, 0.3);
    }

    #[test]
    fn unknown_usage_and_exclusivity_are_neutral() {
        assert_eq!(UsageRights::parse("forever").factor(), 1.0);
        assert_eq!(Exclusivity::parse("galaxy").factor(), 1.0);
    }

    #[test]
    fn enums_serialize_in_screaming_case() {
        let json = serde_json::to_string(&ContentType::Contest).expect("serialize");
        assert_eq!(json, "\"CONTEST\"");
    }

    #[test]
    fn ratio_guards_zero_denominators() {
        assert_eq!(ratio(5.0, 0.0), 0.0);
        assert_eq!(ratio(0.0, 0.0), 0.0);
        assert_eq!(ratio(1.0, 4.0), 0.25);
    }

    #[test]
    fn std_dev_is_population_based() {
        assert_eq!(population_std_dev(&[5.0]), 0.0);
        assert!((population_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn formats_numbers_and_money() {
        assert_eq!(format_number(1234567.4), "1,234,567");
        assert_eq!(format_money(1234.5), "1,234.50");
        assert_eq!(format_money(1.999), "2.00");
        assert_eq!(format_percent(0.125), "12.5%");
    }
}
