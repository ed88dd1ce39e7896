use crate::{mean, population_std_dev, PostStat};

/// Single-pass z-score filter on `views`.
///
/// Posts further than `sigma` population standard deviations from the
/// reference mean are dropped. The statistics are computed once, so a second
/// outlier masked by the first is kept.
#[derive(Debug, Clone)]
pub struct OutlierFilter {
    sigma: f64,
}

impl Default for OutlierFilter {
    fn default() -> Self {
        Self { sigma: 2.0 }
    }
}

impl OutlierFilter {
    pub fn new(sigma: f64) -> Self {
        Self { sigma }
    }

    /// Filters `posts` against the statistics of `reference`, or of `posts`
    /// themselves when no reference set is given.
    pub fn filter(&self, posts: &[PostStat], reference: Option<&[PostStat]>) -> Vec<PostStat> {
        let reference = reference.unwrap_or(posts);
        let views: Vec<f64> = reference.iter().map(|post| post.views as f64).collect();
        let center = mean(&views);
        let spread = population_std_dev(&views);

        let kept: Vec<PostStat> = posts
            .iter()
            .filter(|post| !self.is_outlier(post.views as f64, center, spread))
            .cloned()
            .collect();

        let excluded = posts.len() - kept.len();
        if excluded > 0 {
            tracing::debug!(
                excluded,
                mean_views = center,
                std_dev = spread,
                "outlier filter dropped posts"
            );
        }
        kept
    }

    pub fn is_outlier(&self, views: f64, center: f64, spread: f64) -> bool {
        (views - center).abs() > self.sigma * spread
    }
}
