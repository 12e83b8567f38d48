//! Service lifecycle: load the model, bind, serve until a shutdown signal.

use std::future::Future;
use std::sync::Arc;

use eyre::WrapErr;
use senti_core::{redact, Config};
use senti_ml::{Classifier, ModelClassifier};
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

use crate::routes::{router, AppState};

/// Run the inference service. The model is loaded before the socket is
/// bound, so no connection is accepted until the service is ready.
///
/// # Errors
///
/// Returns an error if the model cannot be loaded or the address cannot be bound.
#[instrument(skip(config), fields(environment = %config.environment, model = %config.model_name))]
pub async fn run(config: Config) -> eyre::Result<()> {
    info!(
        api_key = %redact::secret_preview(config.api_key.expose()),
        "API key loaded"
    );

    let config = Arc::new(config);
    let loader = Arc::clone(&config);
    info!("loading model");
    let classifier = tokio::task::spawn_blocking(move || ModelClassifier::load(&loader))
        .await
        .wrap_err("model loader panicked")?
        .wrap_err("failed to load model")?;
    info!("model ready");

    let listener = TcpListener::bind(config.bind_addr())
        .await
        .wrap_err_with(|| format!("failed to bind {}", config.bind_addr()))?;

    serve(listener, config, Arc::new(classifier), shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve<F>(
    listener: TcpListener,
    config: Arc<Config>,
    classifier: Arc<dyn Classifier>,
    shutdown: F,
) -> eyre::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(%addr, debug = config.debug, "inference service listening");

    let app = router(AppState::new(config, classifier));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .wrap_err("server error")?;

    info!("inference service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(%e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(%e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("shutdown signal received");
}
