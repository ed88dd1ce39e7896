use chrono::NaiveDate;

use crate::scoring::seasonal_factor;
use crate::tables::{CONFIDENCE_FLOOR, CONFIDENCE_TIERS};
use crate::{non_negative, round_to, Exclusivity, UsageRights};

/// Final price with its negotiation band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBand {
    pub base: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone)]
pub struct PriceComposer {
    band_low: f64,
    band_high: f64,
}

impl Default for PriceComposer {
    fn default() -> Self {
        Self::new(0.85, 1.15)
    }
}

impl PriceComposer {
    pub fn new(band_low: f64, band_high: f64) -> Self {
        Self {
            band_low,
            band_high,
        }
    }

    /// Weighted blend of the CPM and CPA prices. Weights are used as given;
    /// they are expected, not required, to sum to one.
    pub fn hybrid_base(&self, cpm_price: f64, cpa_component: f64, cpm_weight: f64, cpa_weight: f64) -> f64 {
        non_negative(cpm_price * cpm_weight + cpa_component * cpa_weight)
    }

    /// Applies usage rights, exclusivity and the publish-month factor, rounded to cents.
    pub fn apply_multipliers(
        &self,
        hybrid_base: f64,
        usage_rights: UsageRights,
        exclusivity: Exclusivity,
        publish_date: NaiveDate,
    ) -> f64 {
        let price = hybrid_base
            * usage_rights.factor()
            * exclusivity.factor()
            * seasonal_factor(publish_date);
        round_to(non_negative(price), 2)
    }

    pub fn band(&self, base: f64) -> PriceBand {
        let base = non_negative(base);
        PriceBand {
            base,
            min: round_to(base * self.band_low, 2),
            max: round_to(base * self.band_high, 2),
        }
    }
}

/// Coarse reliability from the number of comparable posts.
pub fn confidence_for_sample(count: usize) -> f64 {
    CONFIDENCE_TIERS
        .iter()
        .find(|(minimum, _)| count >= *minimum)
        .map(|(_, confidence)| *confidence)
        .unwrap_or(CONFIDENCE_FLOOR)
}
