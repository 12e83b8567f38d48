use std::path::PathBuf;

pub type Result<T> = eyre::Result<T>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API_KEY is not set")]
    MissingApiKey,
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SentimentError {
    #[error("expected 2 logits, got {0}")]
    LogitCount(usize),
    #[error("model produced non-finite logits")]
    NonFinite,
}
