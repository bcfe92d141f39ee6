//! Boletin HTTP Application Shell
//!
//! This is the thin service that triggers runs over HTTP.
//! Extraction and delivery live in the `crates/` directory.

pub mod response;
mod state;

pub use response::RunResponse;
pub use state::AppState;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Build the router with the trigger and health endpoints.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(run_once))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Serve the router on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!("Listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Run the pipeline once; the session is released before the response is built.
///
/// The run is detached from the request so a client that disconnects
/// cannot cancel it midway.
async fn run_once(State(state): State<AppState>) -> RunResponse {
    info!("Run requested");
    let orchestrator = Arc::clone(&state.orchestrator);
    match tokio::spawn(async move { orchestrator.run().await }).await {
        Ok(result) => RunResponse::from(result),
        Err(e) => {
            tracing::error!(error = %e, "run task did not complete");
            RunResponse::aborted(e.to_string())
        }
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Initialize tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,boletin=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}
