pub mod composer;
pub mod cpa;
pub mod cpm;
pub mod outlier;
pub mod predictor;
pub mod request;
pub mod seasonal;
pub mod strategy;
pub mod theme;

pub use composer::{confidence_for_sample, PriceBand, PriceComposer};
pub use cpa::{CpaBreakdown, CpaPricer};
pub use cpm::{CpmBreakdown, CpmPricer};
pub use outlier::OutlierFilter;
pub use predictor::{AdjustmentWeights, PerformancePredictor, PerformanceSignals, Prediction};
pub use request::{QuoteBreakdown, RequestStrategy};
pub use seasonal::{seasonal_factor, MonthRange};
pub use strategy::{HistoryQuote, PricingEngine, PricingInput, ScoringStrategy, StrategyKind};
pub use theme::{ThemeRequest, ThemeStrategy, ViewSample};
