use thiserror::Error;

/// Errors raised at the edges of the pricing engine.
///
/// The valuation functions themselves never fail; these cover input
/// validation, configuration and the creator store.
#[derive(Debug, Error)]
pub enum PricingError {
    /// Rejected caller input (missing body, malformed fields, out-of-range weights).
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("creator store error: {0}")]
    Store(String),
}

impl PricingError {
    pub fn validation(message: impl Into<String>) -> Self {
        PricingError::Validation(message.into())
    }

    /// Stable machine-readable code, used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            PricingError::Validation(_) => "validation_error",
            PricingError::Config(_) => "config_error",
            PricingError::Store(_) => "store_error",
        }
    }
}
