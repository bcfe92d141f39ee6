//! Boletin service entry point.

use anyhow::Context;
use boletin_app::{init_tracing, serve, AppState};
use boletin_browser::ChromiumLauncher;
use boletin_core::AppConfig;
use boletin_scanner::RunOrchestrator;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Boletin v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load_with_env().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;
    info!(target = %config.target.url, sink = %config.delivery.sink_url, "Configuration loaded");

    let launcher = Arc::new(ChromiumLauncher::new(&config.browser));
    let orchestrator = RunOrchestrator::from_config(&config, launcher)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    serve(listener, AppState::new(orchestrator), shutdown_signal()).await?;

    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
