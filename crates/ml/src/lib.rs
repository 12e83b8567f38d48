//! Two-class sequence classification behind the [`Classifier`] trait.

// Ensure at least one ML backend is enabled
#[cfg(not(any(feature = "onnx", feature = "onnx-fetch", feature = "candle")))]
compile_error!(
    "At least one ML backend must be enabled: 'onnx', 'onnx-fetch' (default), or 'candle'"
);

pub mod backend;
pub mod model;

#[cfg(feature = "candle")]
pub mod candle;
#[cfg(any(feature = "onnx", feature = "onnx-fetch"))]
pub mod onnx;

use std::sync::{Mutex, PoisonError};

use backend::MlBackend;
use senti_core::{Config, MlBackendKind, Probabilities, Result};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info, instrument, trace};

/// Text in, class probabilities out. The trained model is an opaque
/// capability; any binding that honours this contract is interchangeable.
pub trait Classifier: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if tokenization or inference fails.
    fn classify(&self, text: &str, max_length: usize) -> Result<Probabilities>;
}

/// Tokenizer plus backend for one pretrained checkpoint.
pub struct ModelClassifier {
    inner: Mutex<Inner>,
}

struct Inner {
    tokenizer: Tokenizer,
    backend: Box<dyn MlBackend>,
}

impl ModelClassifier {
    /// Download (or reuse from the Hub cache) and load the configured model.
    /// Blocks until the tokenizer and backend are ready.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be downloaded or loaded.
    #[instrument(skip(config), fields(model = %config.model_name, backend = ?config.ml_backend))]
    pub fn load(config: &Config) -> Result<Self> {
        debug!("loading classifier");
        let repo = model::hf_repo(config)?;

        let tokenizer_path = model::fetch(&repo, model::TOKENIZER_FILE)?;
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| eyre::eyre!(e))?;
        debug!("tokenizer loaded");

        let kind = resolve_backend(config.ml_backend);
        let backend: Box<dyn MlBackend> = match kind {
            MlBackendKind::Candle => load_candle_backend(&repo)?,
            MlBackendKind::Onnx | MlBackendKind::Auto => load_onnx_backend(&repo)?,
        };
        info!(backend = ?kind, "ML backend initialized");

        Ok(Self::new(tokenizer, backend))
    }

    #[must_use]
    pub fn new(mut tokenizer: Tokenizer, backend: Box<dyn MlBackend>) -> Self {
        tokenizer.with_padding(None);
        Self {
            inner: Mutex::new(Inner { tokenizer, backend }),
        }
    }
}

impl Classifier for ModelClassifier {
    fn classify(&self, text: &str, max_length: usize) -> Result<Probabilities> {
        // Truncation is reapplied on every call, so state left by a panicked
        // call is safe to reuse.
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let Inner { tokenizer, backend } = &mut *guard;

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..TruncationParams::default()
            }))
            .map_err(|e| eyre::eyre!(e))?;

        let encoding = tokenizer.encode(text, true).map_err(|e| eyre::eyre!(e))?;
        let logits = backend.logits(encoding.get_ids(), encoding.get_attention_mask())?;
        let probs = Probabilities::from_logits(&logits)?;
        trace!(
            tokens = encoding.len(),
            positive = probs.positive,
            "text classified"
        );
        Ok(probs)
    }
}

/// Concrete backend for `kind`. `Auto` prefers ONNX, which serves any
/// exported checkpoint; Candle only loads DeBERTa-v2.
fn resolve_backend(kind: MlBackendKind) -> MlBackendKind {
    match kind {
        MlBackendKind::Auto if cfg!(any(feature = "onnx", feature = "onnx-fetch")) => {
            MlBackendKind::Onnx
        }
        MlBackendKind::Auto => MlBackendKind::Candle,
        explicit => explicit,
    }
}

#[cfg(any(feature = "onnx", feature = "onnx-fetch"))]
fn load_onnx_backend(repo: &hf_hub::api::sync::ApiRepo) -> Result<Box<dyn MlBackend>> {
    let model_path = model::fetch(repo, model::ONNX_MODEL_FILE)?;
    Ok(Box::new(onnx::OnnxBackend::load(&model_path)?))
}

#[cfg(not(any(feature = "onnx", feature = "onnx-fetch")))]
fn load_onnx_backend(_repo: &hf_hub::api::sync::ApiRepo) -> Result<Box<dyn MlBackend>> {
    Err(eyre::eyre!(
        "onnx backend not compiled in (enable 'onnx' or 'onnx-fetch' feature)"
    ))
}

#[cfg(feature = "candle")]
fn load_candle_backend(repo: &hf_hub::api::sync::ApiRepo) -> Result<Box<dyn MlBackend>> {
    let safetensors_path = model::fetch(repo, model::SAFETENSORS_FILE)?;
    let config_path = model::fetch(repo, model::MODEL_CONFIG_FILE)?;
    Ok(Box::new(candle::CandleBackend::load(
        &safetensors_path,
        &config_path,
    )?))
}

#[cfg(not(feature = "candle"))]
fn load_candle_backend(_repo: &hf_hub::api::sync::ApiRepo) -> Result<Box<dyn MlBackend>> {
    Err(eyre::eyre!(
        "candle backend not compiled in (enable 'candle' feature)"
    ))
}
