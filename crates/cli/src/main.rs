//! senti CLI - sentiment inference service and terminal client.

mod cli;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use senti_client::{render_config_error, render_error, render_report, Page, PageInfo};
use senti_client::{PredictClient, Predictor, Report};
use senti_core::setup::{self, SetupOutcome};
use senti_core::{Config, ConfigError};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_env("SENTI_LOG").unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    init_tracing(match cli.command {
        cli::Command::Serve => "info",
        _ => "warn",
    });

    match &cli.command {
        cli::Command::Serve => run_serve(&cli),
        cli::Command::Page => run_page(&cli),
        cli::Command::Analyze { text } => run_analyze(&cli, text),
        cli::Command::Setup { dir } => run_setup(&cli.config, dir),
    }
}

fn load_config(cli: &cli::Cli) -> Result<Config, ConfigError> {
    let mut config = Config::load(&cli.config)?;
    config.ml_backend = cli.backend;
    debug!(?config, "configuration loaded");
    Ok(config)
}

fn run_serve(cli: &cli::Cli) -> ExitCode {
    let config = match load_config(cli) {
        Ok(c) => c,
        Err(e) => {
            error!(%e, "configuration error, refusing to start");
            eprintln!("senti: {e}");
            return ExitCode::FAILURE;
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            warn!(%e, "failed to build tokio runtime");
            eprintln!("runtime error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(senti_server::run(config)) {
        Ok(()) => {
            info!("service shutdown cleanly");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "service error");
            eprintln!("senti: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn client_from(cli: &cli::Cli) -> Option<(Config, PredictClient)> {
    let config = match load_config(cli) {
        Ok(c) => c,
        Err(e) => {
            println!("{}", render_config_error(&e));
            return None;
        }
    };
    match PredictClient::new(&config) {
        Ok(client) => Some((config, client)),
        Err(e) => {
            eprintln!("senti: failed to build HTTP client: {e}");
            None
        }
    }
}

fn run_page(cli: &cli::Cli) -> ExitCode {
    let Some((config, client)) = client_from(cli) else {
        return ExitCode::FAILURE;
    };
    debug!(url = client.url(), "starting page");

    let page = Page::new(client, PageInfo::from(&config));
    match page.run(std::io::stdin().lock(), std::io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("senti: terminal error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_analyze(cli: &cli::Cli, text: &str) -> ExitCode {
    let Some((_, client)) = client_from(cli) else {
        return ExitCode::FAILURE;
    };
    if text.is_empty() {
        eprintln!("Please enter a text.");
        return ExitCode::FAILURE;
    }

    match client.predict(text) {
        Ok(resp) => {
            print!("{}", render_report(&Report::from_response(&resp)));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", render_error(&e));
            ExitCode::FAILURE
        }
    }
}

fn run_setup(config_path: &Path, dir: &Path) -> ExitCode {
    println!("Setting up senti in {}", dir.display());

    match setup::create_directories(dir) {
        Ok(created) => {
            for d in created {
                println!("  directory ready: {}", d.display());
            }
        }
        Err(e) => {
            eprintln!("senti: {e:#}");
            return ExitCode::FAILURE;
        }
    }

    let path = if config_path.is_relative() {
        dir.join(config_path)
    } else {
        config_path.to_path_buf()
    };
    match setup::write_config_file(&path) {
        Ok(SetupOutcome::Created { key_preview }) => {
            println!("  created {} with API key {key_preview}", path.display());
            println!("  keep this key secret; do not share or commit it");
        }
        Ok(SetupOutcome::AlreadyExists) => {
            println!("  {} already exists, left unchanged", path.display());
        }
        Err(e) => {
            eprintln!("senti: {e:#}");
            return ExitCode::FAILURE;
        }
    }

    println!("\nNext steps:");
    println!("  1. start the service:  senti serve");
    println!("  2. open the page:      senti page");
    ExitCode::SUCCESS
}
