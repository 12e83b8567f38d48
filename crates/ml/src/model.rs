//! `HuggingFace` model download/caching.

use eyre::WrapErr;
use senti_core::{Config, Result};
use tracing::debug;

pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const ONNX_MODEL_FILE: &str = "onnx/model.onnx";
pub const SAFETENSORS_FILE: &str = "model.safetensors";
pub const MODEL_CONFIG_FILE: &str = "config.json";

/// Get a `HuggingFace` Hub repo handle for the configured model.
///
/// # Errors
///
/// Returns an error if the `HuggingFace` API client cannot be built.
pub fn hf_repo(config: &Config) -> Result<hf_hub::api::sync::ApiRepo> {
    use hf_hub::api::sync::ApiBuilder;

    let mut builder = ApiBuilder::new();
    if let Some(token) = &config.hf_token {
        debug!("using HuggingFace token from config");
        builder = builder.with_token(Some(token.expose().to_string()));
    } else {
        debug!("no HuggingFace token configured");
    }
    let api = builder
        .build()
        .wrap_err("failed to build HuggingFace API client")?;

    debug!(repo = %config.model_name, "HuggingFace repo handle created");
    Ok(api.model(config.model_name.clone()))
}

/// Fetch `file` from the repo, downloading into the local cache on first use.
///
/// # Errors
///
/// Returns an error if the file is missing from the repo or the download fails.
pub fn fetch(repo: &hf_hub::api::sync::ApiRepo, file: &str) -> Result<String> {
    let path = repo
        .get(file)
        .map_err(|e| eyre::eyre!("{file} download failed: {e}"))?;
    Ok(path.to_string_lossy().into_owned())
}
