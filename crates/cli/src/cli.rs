//! CLI argument parsing.

use clap::{Parser, Subcommand};
use senti_core::config::DEFAULT_CONFIG_FILE;
use senti_core::MlBackendKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "senti", about = "Sentiment analysis service and terminal client")]
pub struct Cli {
    /// Path to the TOML config file (environment variables override it)
    #[arg(long, env = "SENTI_CONFIG", default_value = DEFAULT_CONFIG_FILE, global = true)]
    pub config: PathBuf,

    /// Inference backend: auto, onnx or candle
    #[arg(long, env = "SENTI_BACKEND", default_value = "auto", global = true)]
    pub backend: MlBackendKind,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load the model and serve the inference API
    Serve,
    /// Interactive sentiment page talking to a running service
    Page,
    /// Analyze a single text and exit (0 on success, 1 on any error)
    Analyze {
        /// Text to analyze
        #[arg(name = "TEXT")]
        text: String,
    },
    /// Create working directories and a config file with a fresh API key
    Setup {
        /// Project root; a relative --config path is resolved against it
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}
