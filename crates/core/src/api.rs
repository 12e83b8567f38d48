//! JSON bodies exchanged between the service and the client page.

use serde::{Deserialize, Serialize};

use crate::sentiment::Probabilities;

/// Header carrying the shared secret on `POST /predict`.
pub const API_KEY_HEADER: &str = "x-api-key";

pub const STATUS_HEALTHY: &str = "healthy";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub negative: f32,
    pub positive: f32,
    /// Character count of the raw input, not the token count.
    pub text_length: usize,
}

impl PredictResponse {
    #[must_use]
    pub fn new(probs: Probabilities, text: &str) -> Self {
        Self {
            negative: probs.negative,
            positive: probs.positive,
            text_length: text.chars().count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootResponse {
    pub status: String,
    pub environment: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub environment: String,
    pub model: String,
    pub api_key_configured: bool,
}

/// Body of every non-2xx response from the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
