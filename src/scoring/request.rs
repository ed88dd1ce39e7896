use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;
use crate::scoring::{
    confidence_for_sample, AdjustmentWeights, CpaBreakdown, CpaPricer, CpmBreakdown, CpmPricer,
    OutlierFilter, PerformancePredictor, Prediction, PriceComposer, StrategyKind,
};
use crate::{mean, round_to, PostStat, PricingRequest, PricingResult};

/// Every intermediate figure behind a request-driven quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteBreakdown {
    pub prediction: Prediction,
    pub audience_size: f64,
    pub cpm: CpmBreakdown,
    pub cpm_price: f64,
    pub cpa: CpaBreakdown,
    pub hybrid_base: f64,
    pub comparable_posts: usize,
    pub result: PricingResult,
}

/// Prices from raw post history plus niche/destination metadata.
#[derive(Debug, Clone, Default)]
pub struct RequestStrategy {
    predictor: PerformancePredictor,
    cpm: CpmPricer,
    cpa: CpaPricer,
    composer: PriceComposer,
}

impl RequestStrategy {
    pub fn new(
        predictor: PerformancePredictor,
        cpm: CpmPricer,
        cpa: CpaPricer,
        composer: PriceComposer,
    ) -> Self {
        Self {
            predictor,
            cpm,
            cpa,
            composer,
        }
    }

    pub fn from_config(config: &PricingConfig) -> Self {
        let predictor = PerformancePredictor::new(
            config.predictor.decay,
            AdjustmentWeights::default(),
            OutlierFilter::new(config.predictor.outlier_sigma),
        );
        let composer = PriceComposer::new(config.composer.band_low, config.composer.band_high);
        Self::new(predictor, CpmPricer::new(), CpaPricer::new(), composer)
    }

    pub fn predictor(&self) -> &PerformancePredictor {
        &self.predictor
    }

    pub fn quote(&self, history: &[PostStat], request: &PricingRequest) -> PricingResult {
        self.quote_detailed(history, request).result
    }

    pub fn quote_detailed(&self, history: &[PostStat], request: &PricingRequest) -> QuoteBreakdown {
        let prediction =
            self.predictor
                .predict(history, request.content_type, request.publish_date);
        let predicted_views = prediction.predicted_views;

        let audience_size = request
            .followers
            .map(|followers| followers as f64)
            .unwrap_or_else(|| estimate_audience(history));
        let cpm = self.cpm.price(
            request.content_type,
            audience_size,
            &prediction.signals,
            &request.niche_category,
        );
        let cpm_price = cpm.cpm * predicted_views / 1000.0;
        let cpa = self.cpa.price(
            history,
            request.content_type,
            &request.destination,
            predicted_views,
        );

        let hybrid_base =
            self.composer
                .hybrid_base(cpm_price, cpa.component, request.cpm_weight, request.cpa_weight);
        let base_price = self.composer.apply_multipliers(
            hybrid_base,
            request.usage_rights,
            request.exclusivity,
            request.publish_date,
        );
        let band = self.composer.band(base_price);

        let comparable_posts = history
            .iter()
            .filter(|post| post.content_type == request.content_type)
            .count();

        let result = PricingResult {
            estimated_views: prediction.estimated_views(),
            applied_cpm: round_to(cpm.cpm, 2),
            base_price: band.base,
            min_price: band.min,
            max_price: band.max,
            confidence: confidence_for_sample(comparable_posts),
            strategy: StrategyKind::Request,
        };

        tracing::debug!(
            content_type = request.content_type.label(),
            niche = %request.niche_category,
            destination = %request.destination,
            cpm = cpm.cpm,
            cpa_component = cpa.component,
            base_price = result.base_price,
            confidence = result.confidence,
            "request quote"
        );

        QuoteBreakdown {
            prediction,
            audience_size,
            cpm,
            cpm_price,
            cpa,
            hybrid_base,
            comparable_posts,
            result,
        }
    }
}

/// Mean reach across the whole history; stands in for a follower count the
/// caller did not supply.
pub fn estimate_audience(history: &[PostStat]) -> f64 {
    let reach: Vec<f64> = history.iter().map(|post| post.reach as f64).collect();
    mean(&reach)
}
