use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use senti_core::api::ErrorBody;

/// Failures surfaced to HTTP callers. The body is always `{"detail": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, malformed or wrong key; callers cannot tell which.
    #[error("Unauthorized")]
    Unauthorized,
    /// Body rejected by the JSON extractor (bad syntax, missing field, wrong content type).
    #[error("{detail}")]
    InvalidBody { status: StatusCode, detail: String },
    #[error("Prediction error: {0}")]
    Prediction(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidBody { status, .. } => *status,
            Self::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
