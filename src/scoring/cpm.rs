use serde::{Deserialize, Serialize};

use crate::scoring::PerformanceSignals;
use crate::tables::{
    AUDIENCE_TIERS, COMMENT_LIKE_TIERS, NICHE_BENCHMARKS, NICHE_MULTIPLIERS,
    RELATIVE_ENGAGEMENT_TIERS, SAVE_RATIO_TIERS,
};
use crate::{ratio, ContentType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpmBreakdown {
    pub base: f64,
    pub audience: f64,
    pub engagement: f64,
    pub quality: f64,
    pub niche: f64,
    pub cpm: f64,
}

/// Adaptive cost per thousand views.
#[derive(Debug, Clone, Default)]
pub struct CpmPricer;

impl CpmPricer {
    pub fn new() -> Self {
        Self
    }

    pub fn price(
        &self,
        content_type: ContentType,
        followers: f64,
        signals: &PerformanceSignals,
        niche: &str,
    ) -> CpmBreakdown {
        let base = content_type.base_cpm();
        let audience = audience_multiplier(followers);
        let engagement = engagement_multiplier(signals.engagement_rate, niche);
        let quality = quality_multiplier(signals.save_ratio, signals.comment_like_ratio);
        let niche = NICHE_MULTIPLIERS.get(niche);
        let cpm = crate::non_negative(base * audience * engagement * quality * niche);

        CpmBreakdown {
            base,
            audience,
            engagement,
            quality,
            niche,
            cpm,
        }
    }
}

pub fn audience_multiplier(followers: f64) -> f64 {
    AUDIENCE_TIERS.lookup(followers)
}

/// Engagement relative to the niche's typical rate.
pub fn engagement_multiplier(engagement_rate: f64, niche: &str) -> f64 {
    let relative = ratio(engagement_rate, NICHE_BENCHMARKS.get(niche));
    RELATIVE_ENGAGEMENT_TIERS.lookup(relative)
}

pub fn quality_multiplier(save_ratio: f64, comment_like_ratio: f64) -> f64 {
    (SAVE_RATIO_TIERS.lookup(save_ratio) + COMMENT_LIKE_TIERS.lookup(comment_like_ratio)) / 2.0
}
