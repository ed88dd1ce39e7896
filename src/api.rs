use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use sha2::{Digest, Sha256};

use collab_pricing::{
    CampaignBrief, PricingEngine, PricingError, PricingInput, PricingResult, RankedCreator,
};

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

impl From<PricingError> for ApiError {
    fn from(err: PricingError) -> Self {
        match &err {
            PricingError::Validation(message) => ApiError::new(err.kind(), message.clone()),
            _ => {
                tracing::error!(error = %err, "pricing request failed");
                ApiError::new(err.kind(), err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "validation_error" => StatusCode::BAD_REQUEST,
            "not_found" => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub quote_id: String,
    #[serde(flatten)]
    pub result: PricingResult,
    pub cached: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendResponse {
    pub considered: usize,
    pub results: Vec<RankedCreator>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub creators: usize,
}

/// Deterministic id for a quote: SHA-256 over the parsed input's JSON form,
/// so formatting and key order in the request body do not matter.
pub fn quote_id(input: &PricingInput) -> String {
    let canonical = serde_json::to_vec(input).unwrap_or_default();
    let digest = Sha256::digest(&canonical);
    let hex: String = digest[..12].iter().map(|byte| format!("{:02x}", byte)).collect();
    format!("q_{}", hex)
}

pub fn parse_brief(body: &[u8]) -> Result<CampaignBrief, PricingError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(PricingError::validation("request body is empty"));
    }
    let brief: CampaignBrief = serde_json::from_slice(body)
        .map_err(|err| PricingError::validation(format!("invalid campaign brief: {}", err)))?;
    if !brief.max_budget.is_finite() || brief.max_budget < 0.0 {
        return Err(PricingError::validation("`maxBudget` must be a non-negative number"));
    }
    if !brief.min_engagement_rate.is_finite() {
        return Err(PricingError::validation("`minEngagementRate` must be a number"));
    }
    Ok(brief)
}

pub fn parse_quote(engine: &PricingEngine, body: &[u8]) -> Result<PricingInput, PricingError> {
    let payload = std::str::from_utf8(body)
        .map_err(|_| PricingError::validation("request body must be UTF-8 JSON"))?;
    engine.parse(payload)
}
