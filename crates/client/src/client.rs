//! Blocking HTTP client for `POST /predict`.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use senti_core::api::{PredictRequest, PredictResponse, API_KEY_HEADER};
use senti_core::{Config, Result, Secret};
use tracing::{debug, trace};

/// Why a single submission failed. Every variant is terminal for that
/// submission; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request timed out")]
    Timeout,
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Other(e.to_string())
        }
    }
}

/// Anything that can turn text into a prediction for the page.
pub trait Predictor {
    /// # Errors
    ///
    /// Returns the failure category for display.
    fn predict(&self, text: &str) -> std::result::Result<PredictResponse, ClientError>;
}

pub struct PredictClient {
    http: Client,
    url: String,
    api_key: Secret,
}

impl PredictClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            http,
            url: config.predict_url(),
            api_key: config.api_key.clone(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Predictor for PredictClient {
    fn predict(&self, text: &str) -> std::result::Result<PredictResponse, ClientError> {
        debug!(url = %self.url, text_len = text.len(), "sending prediction request");
        let resp = self
            .http
            .post(&self.url)
            .header(API_KEY_HEADER, self.api_key.expose())
            .json(&PredictRequest {
                text: text.to_string(),
            })
            .send()?;

        let status = resp.status();
        trace!(%status, "prediction response received");
        match status {
            StatusCode::OK => Ok(resp.json::<PredictResponse>()?),
            StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
            other => Err(ClientError::Status(other.as_u16())),
        }
    }
}
