use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{ComposerConfig, PricingConfig};
use crate::error::PricingError;
use crate::scoring::{PriceComposer, RequestStrategy, ThemeRequest, ThemeStrategy};
use crate::{PostStat, PricingRequest, PricingResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Request,
    Theme,
}

impl StrategyKind {
    pub fn label(self) -> &'static str {
        match self {
            StrategyKind::Request => "request",
            StrategyKind::Theme => "theme",
        }
    }
}

/// A way of turning one input shape into a price.
pub trait ScoringStrategy {
    type Input;

    fn kind(&self) -> StrategyKind;

    fn price(&self, input: &Self::Input) -> PricingResult;
}

/// Post history plus the request it should be priced against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuote {
    pub influencer_history: Vec<PostStat>,
    pub request: PricingRequest,
}

impl ScoringStrategy for RequestStrategy {
    type Input = HistoryQuote;

    fn kind(&self) -> StrategyKind {
        StrategyKind::Request
    }

    fn price(&self, input: &HistoryQuote) -> PricingResult {
        self.quote(&input.influencer_history, &input.request)
    }
}

impl ScoringStrategy for ThemeStrategy {
    type Input = ThemeRequest;

    fn kind(&self) -> StrategyKind {
        StrategyKind::Theme
    }

    fn price(&self, input: &ThemeRequest) -> PricingResult {
        self.quote(input)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PricingInput {
    History(HistoryQuote),
    Themes(ThemeRequest),
}

impl PricingInput {
    pub fn kind(&self) -> StrategyKind {
        match self {
            PricingInput::History(_) => StrategyKind::Request,
            PricingInput::Themes(_) => StrategyKind::Theme,
        }
    }

    /// Picks the input shape from the payload: a `themes` field selects the
    /// theme strategy, anything else must carry `influencerHistory` and
    /// `request`.
    pub fn from_json(value: Value) -> Result<Self, PricingError> {
        Self::from_json_with(value, &ComposerConfig::default())
    }

    /// As [`PricingInput::from_json`], with omitted request weights taken
    /// from `defaults`.
    pub fn from_json_with(mut value: Value, defaults: &ComposerConfig) -> Result<Self, PricingError> {
        if !value.is_object() {
            return Err(PricingError::validation("request body must be a JSON object"));
        }

        if value.get("themes").is_some() {
            let request: ThemeRequest = serde_json::from_value(value)
                .map_err(|err| PricingError::validation(format!("invalid theme request: {}", err)))?;
            return Ok(PricingInput::Themes(request));
        }

        for field in ["influencerHistory", "request"] {
            if value.get(field).map_or(true, Value::is_null) {
                return Err(PricingError::validation(format!("missing field `{}`", field)));
            }
        }
        if let Some(request) = value.get_mut("request").and_then(Value::as_object_mut) {
            if !request.contains_key("cmpWeight") && !request.contains_key("cpmWeight") {
                request.insert("cmpWeight".to_string(), Value::from(defaults.default_cpm_weight));
            }
            if !request.contains_key("cpaWeight") {
                request.insert("cpaWeight".to_string(), Value::from(defaults.default_cpa_weight));
            }
        }
        let quote: HistoryQuote = serde_json::from_value(value)
            .map_err(|err| PricingError::validation(format!("invalid pricing request: {}", err)))?;
        validate_weights(&quote.request)?;
        Ok(PricingInput::History(quote))
    }

    pub fn from_json_str(payload: &str) -> Result<Self, PricingError> {
        Self::from_json_str_with(payload, &ComposerConfig::default())
    }

    pub fn from_json_str_with(payload: &str, defaults: &ComposerConfig) -> Result<Self, PricingError> {
        if payload.trim().is_empty() {
            return Err(PricingError::validation("request body is empty"));
        }
        let value: Value = serde_json::from_str(payload)
            .map_err(|err| PricingError::validation(format!("malformed JSON: {}", err)))?;
        Self::from_json_with(value, defaults)
    }
}

pub fn validate_weights(request: &PricingRequest) -> Result<(), PricingError> {
    for (name, weight) in [("cmpWeight", request.cpm_weight), ("cpaWeight", request.cpa_weight)] {
        if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
            return Err(PricingError::validation(format!(
                "`{}` must be between 0 and 1, got {}",
                name, weight
            )));
        }
    }
    Ok(())
}

/// Both strategies behind one entry point; the input shape picks the strategy.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    request: RequestStrategy,
    theme: ThemeStrategy,
    weight_defaults: ComposerConfig,
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::from_config(&PricingConfig::default())
    }
}

impl PricingEngine {
    pub fn new(request: RequestStrategy, theme: ThemeStrategy) -> Self {
        Self {
            request,
            theme,
            weight_defaults: ComposerConfig::default(),
        }
    }

    pub fn from_config(config: &PricingConfig) -> Self {
        let composer = PriceComposer::new(config.composer.band_low, config.composer.band_high);
        Self {
            request: RequestStrategy::from_config(config),
            theme: ThemeStrategy::new(config.theme.clone(), composer),
            weight_defaults: config.composer.clone(),
        }
    }

    /// Parses a JSON payload, filling omitted request weights from the
    /// configured composer defaults.
    pub fn parse(&self, payload: &str) -> Result<PricingInput, PricingError> {
        PricingInput::from_json_str_with(payload, &self.weight_defaults)
    }

    pub fn request_strategy(&self) -> &RequestStrategy {
        &self.request
    }

    pub fn theme_strategy(&self) -> &ThemeStrategy {
        &self.theme
    }

    pub fn price(&self, input: &PricingInput) -> PricingResult {
        match input {
            PricingInput::History(quote) => self.request.price(quote),
            PricingInput::Themes(request) => self.theme.price(request),
        }
    }
}
