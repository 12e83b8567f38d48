//! Runtime configuration for the inference service and the client page.
//!
//! Values come from three layers, highest priority first: process
//! environment, an optional TOML file, built-in defaults.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::redact;

pub const DEFAULT_MODEL: &str = "distilbert/distilbert-base-uncased-finetuned-sst-2-english";
pub const DEFAULT_MAX_LENGTH: usize = 512;
pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONFIG_FILE: &str = "senti.toml";

/// Which inference backend loads the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MlBackendKind {
    /// ONNX when compiled in, otherwise Candle.
    #[default]
    Auto,
    Onnx,
    Candle,
}

impl FromStr for MlBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "onnx" => Ok(Self::Onnx),
            "candle" => Ok(Self::Candle),
            other => Err(format!("unknown backend {other:?} (expected auto, onnx or candle)")),
        }
    }
}

/// A secret value (API key, Hub token). `Debug` never prints more than a short prefix.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Exact, case-sensitive byte comparison against a candidate header value.
    #[must_use]
    pub fn matches(&self, candidate: &[u8]) -> bool {
        self.0.as_bytes() == candidate
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({})", redact::secret_preview(&self.0))
    }
}

/// On-disk layer (`senti.toml`). Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hf_token: Option<String>,
}

impl FileConfig {
    /// Read the file layer. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        toml::from_str(&content)
            .map(Some)
            .map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }
}

/// Immutable process configuration, built once before anything is served.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Secret,
    pub model_name: String,
    pub max_length: usize,
    pub environment: String,
    pub debug: bool,
    pub backend_host: String,
    pub backend_port: u16,
    pub request_timeout: Duration,
    pub hf_token: Option<Secret>,
    pub ml_backend: MlBackendKind,
}

impl Config {
    /// Load from `path` (if present) overlaid with the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingApiKey` if no layer provides a key, or
    /// a parse error for malformed values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = FileConfig::read(path)?;
        Self::from_lookup(file, |key| std::env::var(key).ok())
    }

    /// Build from an optional file layer and an environment lookup.
    /// Empty environment values count as unset.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn from_lookup<F>(file: Option<FileConfig>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = file.unwrap_or_default();
        let env = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let api_key = env("API_KEY")
            .or(file.api_key)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let max_length = match env("MAX_LENGTH") {
            Some(v) => parse_value("MAX_LENGTH", &v)?,
            None => file.max_length.unwrap_or(DEFAULT_MAX_LENGTH),
        };
        if max_length == 0 {
            return Err(ConfigError::InvalidValue {
                key: "MAX_LENGTH",
                value: "0".to_string(),
            });
        }

        let backend_port = match env("BACKEND_PORT") {
            Some(v) => parse_value("BACKEND_PORT", &v)?,
            None => file.backend_port.unwrap_or(DEFAULT_PORT),
        };

        let timeout_secs = match env("REQUEST_TIMEOUT_SECS") {
            Some(v) => parse_value("REQUEST_TIMEOUT_SECS", &v)?,
            None => file.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        let debug = match env("DEBUG") {
            Some(v) => v.eq_ignore_ascii_case("true"),
            None => file.debug.unwrap_or(false),
        };

        Ok(Self {
            api_key: Secret::new(api_key),
            model_name: env("MODEL_NAME")
                .or(file.model_name)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_length,
            environment: env("ENVIRONMENT")
                .or(file.environment)
                .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            debug,
            backend_host: env("BACKEND_HOST")
                .or(file.backend_host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            backend_port,
            request_timeout: Duration::from_secs(timeout_secs),
            hf_token: env("HF_TOKEN").or(file.hf_token).map(Secret::new),
            ml_backend: MlBackendKind::default(),
        })
    }

    /// Config with the given key and defaults everywhere else.
    #[must_use]
    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(key),
            model_name: DEFAULT_MODEL.to_string(),
            max_length: DEFAULT_MAX_LENGTH,
            environment: DEFAULT_ENVIRONMENT.to_string(),
            debug: false,
            backend_host: DEFAULT_HOST.to_string(),
            backend_port: DEFAULT_PORT,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            hf_token: None,
            ml_backend: MlBackendKind::default(),
        }
    }

    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.backend_host, self.backend_port)
    }

    #[must_use]
    pub fn backend_url(&self) -> String {
        format!("http://{}", self.bind_addr())
    }

    #[must_use]
    pub fn predict_url(&self) -> String {
        format!("{}/predict", self.backend_url())
    }
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}
