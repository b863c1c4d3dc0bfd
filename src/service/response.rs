use serde::Serialize;

use crate::errors::EstimationError;
use crate::features::FeatureVector;

/// Successful estimate as returned to the transport layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimationResult {
    pub success: bool,
    pub predicted_price: f64,
    pub location: String,
    pub features_used: FeatureVector,
    /// True when the trained model produced the price, false for the fallback formula
    pub model_used: bool,
}

/// Client error body: `{"success": false, "error": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub success: bool,
    pub error: String,
}

impl From<&EstimationError> for ErrorPayload {
    fn from(err: &EstimationError) -> Self {
        Self {
            success: false,
            error: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EstimationResponse {
    Success(EstimationResult),
    Failure(ErrorPayload),
}

impl EstimationResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, EstimationResponse::Success(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub model_loaded: bool,
}
