//! Theme-driven pricing.
//!
//! Used when the caller knows a creator's declared themes and a history of
//! per-post views and follower counts, rather than full post statistics.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::ThemeConfig;
use crate::scoring::seasonal::{range_boost, MonthRange};
use crate::scoring::{confidence_for_sample, PriceComposer, StrategyKind};
use crate::tables::normalize_key;
use crate::{non_negative, ratio, round_to, ContentType, PricingResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSample {
    #[serde(with = "crate::dates")]
    pub date: NaiveDate,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub followers: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeRequest {
    pub themes: Vec<String>,
    pub content_type: ContentType,
    #[serde(with = "crate::dates")]
    pub publish_date: NaiveDate,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub history: Vec<ViewSample>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeProfile {
    pub name: &'static str,
    /// CPM multiplier.
    pub value: f64,
    /// Expected views per follower.
    pub benchmark: f64,
    pub conversion_rate: f64,
    pub cpa_target: f64,
    pub seasons: &'static [MonthRange],
}

pub const NEUTRAL_THEME: ThemeProfile = ThemeProfile {
    name: "neutral",
    value: 1.0,
    benchmark: 0.10,
    conversion_rate: 0.008,
    cpa_target: 2.5,
    seasons: &[],
};

pub const THEME_PROFILES: &[ThemeProfile] = &[
    ThemeProfile {
        name: "beauty",
        value: 1.15,
        benchmark: 0.12,
        conversion_rate: 0.009,
        cpa_target: 2.6,
        seasons: &[MonthRange::new(11, 12, 1.2), MonthRange::new(2, 2, 1.1)],
    },
    ThemeProfile {
        name: "fashion",
        value: 1.1,
        benchmark: 0.10,
        conversion_rate: 0.008,
        cpa_target: 2.4,
        seasons: &[MonthRange::new(3, 4, 1.1), MonthRange::new(9, 10, 1.1)],
    },
    ThemeProfile {
        name: "travel",
        value: 1.3,
        benchmark: 0.15,
        conversion_rate: 0.006,
        cpa_target: 3.2,
        seasons: &[MonthRange::new(6, 8, 1.25), MonthRange::new(12, 1, 1.1)],
    },
    ThemeProfile {
        name: "tech",
        value: 1.2,
        benchmark: 0.08,
        conversion_rate: 0.007,
        cpa_target: 3.0,
        seasons: &[MonthRange::new(11, 12, 1.2), MonthRange::new(9, 9, 1.1)],
    },
    ThemeProfile {
        name: "food",
        value: 1.0,
        benchmark: 0.14,
        conversion_rate: 0.010,
        cpa_target: 2.0,
        seasons: &[MonthRange::new(11, 12, 1.1)],
    },
    ThemeProfile {
        name: "fitness",
        value: 1.05,
        benchmark: 0.11,
        conversion_rate: 0.011,
        cpa_target: 2.2,
        seasons: &[MonthRange::new(12, 1, 1.3), MonthRange::new(5, 6, 1.1)],
    },
    ThemeProfile {
        name: "gaming",
        value: 0.95,
        benchmark: 0.18,
        conversion_rate: 0.012,
        cpa_target: 1.8,
        seasons: &[MonthRange::new(11, 12, 1.15)],
    },
    ThemeProfile {
        name: "lifestyle",
        value: 1.0,
        benchmark: 0.12,
        conversion_rate: 0.008,
        cpa_target: 2.3,
        seasons: &[],
    },
    ThemeProfile {
        name: "finance",
        value: 1.35,
        benchmark: 0.06,
        conversion_rate: 0.005,
        cpa_target: 4.0,
        seasons: &[MonthRange::new(1, 4, 1.15)],
    },
    ThemeProfile {
        name: "parenting",
        value: 1.05,
        benchmark: 0.10,
        conversion_rate: 0.009,
        cpa_target: 2.5,
        seasons: &[MonthRange::new(8, 9, 1.2)],
    },
];

const THEME_ALIASES: &[(&str, &str)] = &[
    ("beaute", "beauty"),
    ("mode", "fashion"),
    ("voyage", "travel"),
    ("technology", "tech"),
    ("cuisine", "food"),
    ("sport", "fitness"),
    ("famille", "parenting"),
];

pub fn theme_profile(theme: &str) -> ThemeProfile {
    let key = normalize_key(theme);
    let key = THEME_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(key);
    THEME_PROFILES
        .iter()
        .find(|profile| profile.name == key)
        .copied()
        .unwrap_or(NEUTRAL_THEME)
}

/// Per-theme figures averaged across a creator's declared themes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendedTheme {
    pub value: f64,
    pub benchmark: f64,
    pub conversion_rate: f64,
    pub cpa_target: f64,
    pub seasonal_boost: f64,
}

pub fn blend_themes(themes: &[String], month: u32) -> BlendedTheme {
    let profiles: Vec<ThemeProfile> = if themes.is_empty() {
        vec![NEUTRAL_THEME]
    } else {
        themes.iter().map(|theme| theme_profile(theme)).collect()
    };
    BlendedTheme {
        value: average(&profiles, |profile| profile.value),
        benchmark: average(&profiles, |profile| profile.benchmark),
        conversion_rate: average(&profiles, |profile| profile.conversion_rate),
        cpa_target: average(&profiles, |profile| profile.cpa_target),
        seasonal_boost: average(&profiles, |profile| range_boost(profile.seasons, month)),
    }
}

fn average<F>(profiles: &[ThemeProfile], field: F) -> f64
where
    F: Fn(&ThemeProfile) -> f64,
{
    ratio(profiles.iter().map(field).sum::<f64>(), profiles.len() as f64)
}

/// Declared follower count, or the count recorded on the most recent sample.
pub fn audience_size(request: &ThemeRequest) -> u64 {
    if request.followers > 0 {
        return request.followers;
    }
    request
        .history
        .iter()
        .max_by_key(|sample| sample.date)
        .map(|sample| sample.followers)
        .unwrap_or(0)
}

#[derive(Debug, Clone)]
pub struct ThemeStrategy {
    config: ThemeConfig,
    composer: PriceComposer,
}

impl Default for ThemeStrategy {
    fn default() -> Self {
        Self::new(ThemeConfig::default(), PriceComposer::default())
    }
}

impl ThemeStrategy {
    pub fn new(config: ThemeConfig, composer: PriceComposer) -> Self {
        Self { config, composer }
    }

    /// Full weight inside the grace period, then one extra `decay` step per
    /// started week, capped at `max_decay_steps`.
    pub fn decay_weight(&self, age_days: i64) -> f64 {
        let overdue = (age_days - self.config.grace_days).max(0);
        let weeks = (overdue + 6) / 7;
        let steps = (weeks - 1).clamp(0, i64::from(self.config.max_decay_steps.max(0)));
        self.config.decay.powi(steps as i32)
    }

    pub fn expected_views(&self, history: &[ViewSample], publish_date: NaiveDate) -> f64 {
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        for sample in history {
            let age_days = (publish_date - sample.date).num_days().max(0);
            let weight = self.decay_weight(age_days);
            weighted_sum += sample.views as f64 * weight;
            weight_total += weight;
        }
        ratio(weighted_sum, weight_total)
    }

    pub fn quote(&self, request: &ThemeRequest) -> PricingResult {
        let blended = blend_themes(&request.themes, request.publish_date.month());
        let expected_views = self.expected_views(&request.history, request.publish_date);

        let followers = audience_size(request);
        let performance = if followers == 0 {
            1.0
        } else {
            let view_rate = expected_views / followers as f64;
            ratio(view_rate, blended.benchmark).clamp(0.5, 2.0)
        };

        let cpm = non_negative(
            request.content_type.base_cpm() * blended.value * performance * blended.seasonal_boost,
        );
        let cpm_price = cpm * expected_views / 1000.0;
        let cpa_price =
            expected_views * blended.conversion_rate * blended.cpa_target * blended.seasonal_boost;
        let hybrid = self
            .composer
            .hybrid_base(cpm_price, cpa_price, self.config.cpm_weight, self.config.cpa_weight)
            .floor();
        let band = self.composer.band(hybrid);

        tracing::debug!(
            themes = ?request.themes,
            samples = request.history.len(),
            expected_views,
            performance,
            seasonal_boost = blended.seasonal_boost,
            base_price = band.base,
            "theme quote"
        );

        PricingResult {
            estimated_views: expected_views.round().max(0.0) as u64,
            applied_cpm: round_to(cpm, 2),
            base_price: band.base,
            min_price: band.min,
            max_price: band.max,
            confidence: confidence_for_sample(request.history.len()),
            strategy: StrategyKind::Theme,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_canonical_profiles() {
        assert_eq!(theme_profile("Beauté").name, "beauty");
        assert_eq!(theme_profile("VOYAGE").name, "travel");
        assert_eq!(theme_profile("knitting").name, "neutral");
    }

    #[test]
    fn blend_averages_values_and_boosts() {
        let themes = vec!["travel".to_string(), "lifestyle".to_string()];
        let blended = blend_themes(&themes, 7);
        assert!((blended.value - 1.15).abs() < 1e-12);
        assert!((blended.seasonal_boost - 1.125).abs() < 1e-12);
    }

    #[test]
    fn empty_theme_list_is_neutral() {
        let blended = blend_themes(&[], 6);
        assert_eq!(blended.value, 1.0);
        assert_eq!(blended.seasonal_boost, 1.0);
    }

    #[test]
    fn decay_weight_steps_weekly_after_grace() {
        let strategy = ThemeStrategy::default();
        assert_eq!(strategy.decay_weight(0), 1.0);
        assert_eq!(strategy.decay_weight(7), 1.0);
        assert_eq!(strategy.decay_weight(14), 1.0);
        assert!((strategy.decay_weight(15) - 0.9).abs() < 1e-12);
        assert!((strategy.decay_weight(35) - 0.9f64.powi(3)).abs() < 1e-12);
        assert!((strategy.decay_weight(36) - 0.9f64.powi(4)).abs() < 1e-12);
        assert!((strategy.decay_weight(400) - 0.9f64.powi(4)).abs() < 1e-12);
    }
}
