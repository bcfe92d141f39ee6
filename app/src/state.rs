//! Application state management.

use boletin_scanner::RunOrchestrator;
use std::sync::Arc;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Runs one extraction and delivery per request; holds no per-run state
    pub orchestrator: Arc<RunOrchestrator>,
}

impl AppState {
    /// Create new application state around an orchestrator.
    pub fn new(orchestrator: RunOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}
