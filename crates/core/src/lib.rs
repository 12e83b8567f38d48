//! Shared pieces of senti: configuration, wire types, probability shaping.
//! No ML, no async dependencies.

pub mod api;
pub mod config;
pub mod error;
pub mod redact;
pub mod sentiment;
pub mod setup;

pub use config::{Config, MlBackendKind, Secret};
pub use error::{ConfigError, Result, SentimentError};
pub use sentiment::{Probabilities, SentimentLabel};
