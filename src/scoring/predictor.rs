use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::scoring::{seasonal_factor, OutlierFilter};
use crate::{mean, population_std_dev, ratio, ContentType, PostStat};

const ENGAGEMENT_BENCHMARK: f64 = 0.02;
const SAVE_BENCHMARK: f64 = 0.01;
const PROFILE_VISIT_BENCHMARK: f64 = 0.05;
const FOLLOWER_GROWTH_BENCHMARK: f64 = 0.005;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentWeights {
    pub engagement: f64,
    pub saves: f64,
    pub profile_visits: f64,
    pub follower_growth: f64,
    pub reach_stability: f64,
    pub seasonal: f64,
}

impl Default for AdjustmentWeights {
    fn default() -> Self {
        Self {
            engagement: 0.35,
            saves: 0.20,
            profile_visits: 0.15,
            follower_growth: 0.10,
            reach_stability: 0.10,
            seasonal: 0.10,
        }
    }
}

/// Ratios derived from a (filtered) post history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSignals {
    pub engagement_rate: f64,
    pub save_ratio: f64,
    pub profile_visit_ratio: f64,
    pub follower_growth: f64,
    pub comment_like_ratio: f64,
    pub reach_stability: f64,
    pub seasonal_factor: f64,
}

impl PerformanceSignals {
    pub fn from_posts(posts: &[PostStat], publish_date: NaiveDate) -> Self {
        let reach = total(posts, |post| post.reach);
        let views = total(posts, |post| post.views);
        let likes = total(posts, |post| post.likes);

        Self {
            engagement_rate: ratio(total(posts, PostStat::interactions), reach),
            save_ratio: ratio(total(posts, |post| post.saves), reach),
            profile_visit_ratio: ratio(total(posts, |post| post.profile_visits), reach),
            follower_growth: ratio(total(posts, |post| post.new_followers), views),
            comment_like_ratio: ratio(total(posts, |post| post.comments), likes),
            reach_stability: reach_stability(posts),
            seasonal_factor: seasonal_factor(publish_date),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub sample_size: usize,
    pub weighted_views: f64,
    pub adjustment: f64,
    pub confidence_factor: f64,
    /// Unrounded view estimate; downstream pricing uses this value.
    pub predicted_views: f64,
    pub signals: PerformanceSignals,
}

impl Prediction {
    pub fn estimated_views(&self) -> u64 {
        self.predicted_views.round().max(0.0) as u64
    }
}

#[derive(Debug, Clone)]
pub struct PerformancePredictor {
    decay: f64,
    weights: AdjustmentWeights,
    outlier_filter: OutlierFilter,
}

impl Default for PerformancePredictor {
    fn default() -> Self {
        Self::new(0.9, AdjustmentWeights::default(), OutlierFilter::default())
    }
}

impl PerformancePredictor {
    pub fn new(decay: f64, weights: AdjustmentWeights, outlier_filter: OutlierFilter) -> Self {
        Self {
            decay,
            weights,
            outlier_filter,
        }
    }

    /// Posts of `content_type`, with statistical outliers removed.
    pub fn comparable_posts(&self, history: &[PostStat], content_type: ContentType) -> Vec<PostStat> {
        let matching: Vec<PostStat> = history
            .iter()
            .filter(|post| post.content_type == content_type)
            .cloned()
            .collect();
        self.outlier_filter.filter(&matching, None)
    }

    /// Recency-weighted mean of views: the i-th most recent post weighs `decay^i`.
    pub fn weighted_average_views(&self, posts: &[PostStat]) -> f64 {
        if posts.is_empty() {
            return 0.0;
        }
        let mut ordered: Vec<&PostStat> = posts.iter().collect();
        ordered.sort_by(|a, b| b.date.cmp(&a.date));

        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        for (index, post) in ordered.iter().enumerate() {
            let weight = self.decay.powi(index as i32);
            weighted_sum += post.views as f64 * weight;
            weight_total += weight;
        }
        ratio(weighted_sum, weight_total)
    }

    pub fn adjustment(&self, signals: &PerformanceSignals) -> f64 {
        let w = &self.weights;
        w.engagement * (signals.engagement_rate / ENGAGEMENT_BENCHMARK)
            + w.saves * (signals.save_ratio / SAVE_BENCHMARK)
            + w.profile_visits * (signals.profile_visit_ratio / PROFILE_VISIT_BENCHMARK)
            + w.follower_growth * (signals.follower_growth / FOLLOWER_GROWTH_BENCHMARK)
            + w.reach_stability * signals.reach_stability
            + w.seasonal * signals.seasonal_factor
    }

    /// Damps the estimate for volatile or thin histories.
    pub fn confidence_factor(&self, posts: &[PostStat]) -> f64 {
        let views: Vec<f64> = posts.iter().map(|post| post.views as f64).collect();
        let variability = if views.len() < 2 {
            0.0
        } else {
            ratio(population_std_dev(&views), mean(&views))
        };
        let factor = (1.0 - variability / 2.0).max(0.7);

        if posts.len() < 5 {
            factor * 0.8
        } else if posts.len() < 10 {
            factor * 0.9
        } else {
            factor
        }
    }

    pub fn predict(
        &self,
        history: &[PostStat],
        content_type: ContentType,
        publish_date: NaiveDate,
    ) -> Prediction {
        let posts = self.comparable_posts(history, content_type);
        let weighted_views = self.weighted_average_views(&posts);
        let signals = PerformanceSignals::from_posts(&posts, publish_date);
        let adjustment = self.adjustment(&signals);
        let confidence_factor = self.confidence_factor(&posts);
        let predicted_views = crate::non_negative(weighted_views * adjustment * confidence_factor);

        tracing::debug!(
            content_type = content_type.label(),
            sample_size = posts.len(),
            weighted_views,
            adjustment,
            confidence_factor,
            "predicted views"
        );

        Prediction {
            sample_size: posts.len(),
            weighted_views,
            adjustment,
            confidence_factor,
            predicted_views,
            signals,
        }
    }
}

/// `1 - cv(reach)`, floored at zero; perfectly stable (1.0) below two posts.
pub fn reach_stability(posts: &[PostStat]) -> f64 {
    if posts.len() < 2 {
        return 1.0;
    }
    let reach: Vec<f64> = posts.iter().map(|post| post.reach as f64).collect();
    (1.0 - ratio(population_std_dev(&reach), mean(&reach))).max(0.0)
}

pub(crate) fn total<F>(posts: &[PostStat], field: F) -> f64
where
    F: Fn(&PostStat) -> u64,
{
    posts.iter().map(|post| field(post) as f64).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(day: u32, views: u64, reach: u64) -> PostStat {
        PostStat {
            reach,
            likes: 0,
            comments: 0,
            saves: 0,
            views,
            new_followers: 0,
            profile_visits: 0,
            interacting_accounts: 0,
            content_type: ContentType::Post,
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
        }
    }

    fn identical(count: u32) -> Vec<PostStat> {
        (1..=count).map(|day| post(day, 800, 1_000)).collect()
    }

    #[test]
    fn sample_size_tiers_damp_the_estimate() {
        let predictor = PerformancePredictor::default();
        assert_eq!(predictor.confidence_factor(&identical(1)), 0.8);
        assert_eq!(predictor.confidence_factor(&identical(4)), 0.8);
        assert_eq!(predictor.confidence_factor(&identical(5)), 0.9);
        assert_eq!(predictor.confidence_factor(&identical(9)), 0.9);
        assert_eq!(predictor.confidence_factor(&identical(10)), 1.0);
    }

    #[test]
    fn volatile_views_hit_the_floor() {
        let mut posts = identical(9);
        posts.push(post(10, 10_000, 1_000));
        assert_eq!(PerformancePredictor::default().confidence_factor(&posts), 0.7);
    }

    #[test]
    fn reach_stability_is_one_minus_cv() {
        assert_eq!(reach_stability(&[post(1, 100, 100), post(2, 100, 300)]), 0.5);
        assert_eq!(reach_stability(&[post(1, 100, 5_000)]), 1.0);
        assert_eq!(reach_stability(&[]), 1.0);
        assert_eq!(reach_stability(&[post(1, 100, 0), post(2, 100, 1_000)]), 0.0);
    }

    #[test]
    fn saturated_counters_do_not_overflow() {
        let mut posts = vec![post(1, u64::MAX, u64::MAX), post(2, u64::MAX, u64::MAX)];
        for entry in &mut posts {
            entry.likes = u64::MAX;
            entry.comments = u64::MAX;
            entry.saves = u64::MAX;
        }
        let date = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let signals = PerformanceSignals::from_posts(&posts, date);
        assert!(signals.engagement_rate.is_finite());
        assert!((signals.save_ratio - 1.0).abs() < 1e-12);

        let prediction = PerformancePredictor::default().predict(&posts, ContentType::Post, date);
        assert!(prediction.predicted_views.is_finite());
    }
}
