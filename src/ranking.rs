//! Recommendation ranking: screens a creator pool against a campaign brief,
//! prices the survivors and orders them by how much the quote can be trusted.

use crate::config::PricingConfig;
use crate::scoring::predictor::total;
use crate::scoring::RequestStrategy;
use crate::{
    ratio, CampaignBrief, CreatorProfile, PostStat, PricingRequest, PricingResult, RankedCreator,
};

/// Why a creator was left out of a ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    LowEngagement,
    SmallAudience,
    GenderMismatch,
    OverBudget,
}

impl Exclusion {
    pub fn label(self) -> &'static str {
        match self {
            Exclusion::LowEngagement => "low_engagement",
            Exclusion::SmallAudience => "small_audience",
            Exclusion::GenderMismatch => "gender_mismatch",
            Exclusion::OverBudget => "over_budget",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ranker {
    strategy: RequestStrategy,
    cpm_weight: f64,
    cpa_weight: f64,
}

impl Default for Ranker {
    fn default() -> Self {
        Self::from_config(&PricingConfig::default())
    }
}

impl Ranker {
    pub fn new(strategy: RequestStrategy, cpm_weight: f64, cpa_weight: f64) -> Self {
        Self {
            strategy,
            cpm_weight,
            cpa_weight,
        }
    }

    pub fn from_config(config: &PricingConfig) -> Self {
        Self::new(
            RequestStrategy::from_config(config),
            config.ranker.cpm_weight,
            config.ranker.cpa_weight,
        )
    }

    pub fn rank(&self, brief: &CampaignBrief, pool: &[CreatorProfile]) -> Vec<RankedCreator> {
        let mut ranked: Vec<RankedCreator> = pool
            .iter()
            .filter_map(|profile| match self.evaluate(brief, profile) {
                Ok(result) => Some(RankedCreator {
                    influencer: profile.name.clone(),
                    estimated_price: result.base_price,
                    estimated_views: result.estimated_views,
                    confidence: result.confidence,
                }),
                Err(reason) => {
                    tracing::debug!(creator = %profile.name, reason = reason.label(), "creator excluded");
                    None
                }
            })
            .collect();

        // Vec::sort_by is stable, so equal confidences keep pool order.
        ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        ranked
    }

    /// Screens one creator and prices them if they pass.
    pub fn evaluate(
        &self,
        brief: &CampaignBrief,
        profile: &CreatorProfile,
    ) -> Result<PricingResult, Exclusion> {
        if engagement_rate(&profile.posts) < brief.min_engagement_rate {
            return Err(Exclusion::LowEngagement);
        }
        if estimated_followers(profile) < brief.min_reach {
            return Err(Exclusion::SmallAudience);
        }
        if !gender_matches(brief.target_gender.as_deref(), &profile.gender) {
            return Err(Exclusion::GenderMismatch);
        }

        let request = self.request_for(brief, profile);
        let result = self.strategy.quote(&profile.posts, &request);
        if result.base_price > brief.max_budget {
            return Err(Exclusion::OverBudget);
        }

        tracing::debug!(
            creator = %profile.name,
            base_price = result.base_price,
            confidence = result.confidence,
            "creator priced"
        );
        Ok(result)
    }

    fn request_for(&self, brief: &CampaignBrief, profile: &CreatorProfile) -> PricingRequest {
        PricingRequest {
            content_type: brief.content_type,
            niche_category: brief.niche_category.clone(),
            destination: brief.destination.clone(),
            publish_date: brief.publish_date,
            cpm_weight: self.cpm_weight,
            cpa_weight: self.cpa_weight,
            usage_rights: brief.usage_rights,
            exclusivity: brief.exclusivity,
            followers: Some(estimated_followers(profile)),
        }
    }
}

/// Interactions over reach across all of a creator's posts.
pub fn engagement_rate(posts: &[PostStat]) -> f64 {
    let interactions = total(posts, PostStat::interactions);
    let reach = total(posts, |post| post.reach);
    ratio(interactions, reach)
}

/// The declared follower count; no independent estimate is made.
pub fn estimated_followers(profile: &CreatorProfile) -> u64 {
    profile.followers
}

fn gender_matches(target: Option<&str>, gender: &str) -> bool {
    match target.map(str::trim) {
        None => true,
        Some(target) if target.is_empty() || target.eq_ignore_ascii_case("all") => true,
        Some(target) => target.eq_ignore_ascii_case(gender.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_filter_ignores_case_and_all() {
        assert!(gender_matches(None, "F"));
        assert!(gender_matches(Some("ALL"), "M"));
        assert!(gender_matches(Some(""), "M"));
        assert!(gender_matches(Some("female"), "Female"));
        assert!(!gender_matches(Some("F"), "M"));
    }

    #[test]
    fn engagement_rate_is_zero_without_reach() {
        assert_eq!(engagement_rate(&[]), 0.0);
    }

    #[test]
    fn engagement_rate_handles_maximal_counters() {
        let post = PostStat {
            reach: u64::MAX,
            likes: u64::MAX,
            comments: u64::MAX,
            saves: u64::MAX,
            views: u64::MAX,
            new_followers: 0,
            profile_visits: 0,
            interacting_accounts: 0,
            content_type: crate::ContentType::Post,
            date: chrono::NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
        };
        assert_eq!(engagement_rate(&[post.clone(), post]), 1.0);
    }
}
