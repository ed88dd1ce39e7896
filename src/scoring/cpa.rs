use serde::{Deserialize, Serialize};

use crate::tables::DESTINATION_FACTORS;
use crate::{mean, ratio, ContentType, PostStat};

const HISTORY_WEIGHT: f64 = 0.7;
const BASE_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpaBreakdown {
    pub conversion_rate: f64,
    pub target_cpa: f64,
    pub component: f64,
}

/// Cost-per-acquisition price component.
#[derive(Debug, Clone, Default)]
pub struct CpaPricer;

impl CpaPricer {
    pub fn new() -> Self {
        Self
    }

    pub fn price(
        &self,
        history: &[PostStat],
        content_type: ContentType,
        destination: &str,
        predicted_views: f64,
    ) -> CpaBreakdown {
        let conversion_rate = conversion_rate(history, content_type, destination);
        let target_cpa = target_cpa(content_type, destination);
        let component = crate::non_negative(predicted_views * conversion_rate * target_cpa);

        CpaBreakdown {
            conversion_rate,
            target_cpa,
            component,
        }
    }
}

/// Base rate for the content type, blended 70/30 with the observed
/// follower-per-view rate when matching history exists, then geo-adjusted.
pub fn conversion_rate(history: &[PostStat], content_type: ContentType, destination: &str) -> f64 {
    let base = content_type.base_conversion_rate();
    let observed: Vec<f64> = history
        .iter()
        .filter(|post| post.content_type == content_type)
        .map(|post| ratio(post.new_followers as f64, post.views as f64))
        .collect();

    let rate = if observed.is_empty() {
        base
    } else {
        HISTORY_WEIGHT * mean(&observed) + BASE_WEIGHT * base
    };
    rate * DESTINATION_FACTORS.get(destination)
}

pub fn target_cpa(content_type: ContentType, destination: &str) -> f64 {
    content_type.target_cpa() * DESTINATION_FACTORS.get(destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reel(views: u64, new_followers: u64) -> PostStat {
        PostStat {
            reach: views,
            likes: 0,
            comments: 0,
            saves: 0,
            views,
            new_followers,
            profile_visits: 0,
            interacting_accounts: 0,
            content_type: ContentType::Reel,
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        }
    }

    #[test]
    fn without_history_uses_base_rate() {
        let rate = conversion_rate(&[], ContentType::Contest, "europe_west");
        assert!((rate - 0.015).abs() < 1e-12);
    }

    #[test]
    fn history_is_blended_with_base_rate() {
        let history = vec![reel(1_000, 20), reel(2_000, 0)];
        // mean(0.02, 0.0) = 0.01 -> 0.7 * 0.01 + 0.3 * 0.01
        let rate = conversion_rate(&history, ContentType::Reel, "europe_west");
        assert!((rate - 0.01).abs() < 1e-12);
    }

    #[test]
    fn destination_scales_rate_and_target() {
        let breakdown = CpaPricer::new().price(&[], ContentType::Story, "asia", 1_000.0);
        assert!((breakdown.conversion_rate - 0.005 * 1.7).abs() < 1e-12);
        assert!((breakdown.target_cpa - 1.8 * 1.7).abs() < 1e-12);
        assert!((breakdown.component - 1_000.0 * 0.0085 * 3.06).abs() < 1e-9);
    }

    #[test]
    fn unknown_destination_uses_default_factor() {
        assert!((target_cpa(ContentType::Post, "mars") - 2.5 * 1.2).abs() < 1e-12);
    }
}
