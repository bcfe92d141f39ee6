//! JSON bodies returned by the HTTP trigger.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use boletin_core::{ErrorKind, OutcomeKind, RunPhase, RunResult};
use serde::{Deserialize, Serialize};

const SUCCESS_MESSAGE: &str = "Proceso de scraping completado y datos enviados al webhook.";
const FAILURE_MESSAGE: &str = "Falló el proceso de scraping.";

/// Outcome of one triggered run, as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RunResponse {
    /// The payload reached the sink
    #[serde(rename_all = "camelCase")]
    Success {
        message: String,
        record_count: usize,
        outcome_kind: Option<OutcomeKind>,
        sink_status: Option<u16>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content_length: Option<usize>,
    },
    /// The run failed; the session was released before this was built
    #[serde(rename_all = "camelCase")]
    Error {
        message: String,
        error_kind: Option<ErrorKind>,
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        phase: Option<RunPhase>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sink_status: Option<u16>,
    },
}

impl RunResponse {
    /// Error body for a run whose task ended without a result.
    pub fn aborted(error: impl Into<String>) -> Self {
        Self::Error {
            message: FAILURE_MESSAGE.to_string(),
            error_kind: None,
            error: error.into(),
            phase: None,
            sink_status: None,
        }
    }

    /// HTTP status for this body.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Success { .. } => StatusCode::OK,
            Self::Error { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RunResult> for RunResponse {
    fn from(result: RunResult) -> Self {
        if result.success {
            Self::Success {
                message: SUCCESS_MESSAGE.to_string(),
                record_count: result.record_count,
                outcome_kind: result.outcome_kind,
                sink_status: result.sink_status,
                content_length: result.content_length,
            }
        } else {
            Self::Error {
                message: FAILURE_MESSAGE.to_string(),
                error_kind: result.error_kind,
                error: result.error_message.unwrap_or_default(),
                phase: result.failed_phase,
                sink_status: result.sink_status,
            }
        }
    }
}

impl IntoResponse for RunResponse {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}
