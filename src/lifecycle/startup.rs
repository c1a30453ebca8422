//! Startup orchestration.
//!
//! Order: config → logging → metrics → store → schema → listener → serve.
//! Config, logging and bind errors are fatal. A schema initialisation
//! failure is logged and startup continues; the affected routes report the
//! store error per request.

use std::net::SocketAddr;
use std::path::Path;

use tokio::net::TcpListener;

use crate::config::{load_config, AppConfig};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::{logging, metrics};
use crate::store;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Load configuration, start every subsystem and serve until a termination
/// signal arrives.
pub async fn run(config_path: Option<&Path>) -> Result<(), BoxError> {
    let config = load_config(config_path)?;
    logging::init(&config.observability)?;

    tracing::info!("visit-tracker v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        database = ?config.database,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    let _signals = shutdown.trigger_on_signal();

    serve(config, shutdown).await
}

/// Everything after configuration and logging; split out so tests can
/// drive a fully started server.
pub async fn serve(config: AppConfig, shutdown: Shutdown) -> Result<(), BoxError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)
            .map_err(|e| format!("failed to install metrics exporter: {}", e))?;
    }

    let store = store::from_config(&config.database);
    match store.init_schema().await {
        Ok(()) => tracing::info!(backend = store.backend(), "Database initialized successfully"),
        Err(e) => tracing::error!(backend = store.backend(), error = %e, "Database initialization error"),
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, store);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
