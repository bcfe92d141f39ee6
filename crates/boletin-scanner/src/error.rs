//! Error type for extraction runs.

use boletin_browser::BrowserError;
use boletin_core::{ConfigError, ErrorKind};
use thiserror::Error;

/// Failures raised while building or driving a run.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The browser session could not be started
    #[error("could not start a browser session: {0}")]
    Launch(#[source] BrowserError),

    /// A session operation failed after launch
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// A configured selector does not parse
    #[error("invalid selector for strategy {strategy} ({field}): {reason}")]
    InvalidSelector {
        /// Strategy name
        strategy: String,
        /// Which selector of the strategy
        field: &'static str,
        /// Parser message
        reason: String,
    },

    /// One matched element could not be turned into a record
    #[error("element {index} of strategy {strategy} skipped: {reason}")]
    Element {
        /// Strategy name
        strategy: String,
        /// Position among the strategy's matches
        index: usize,
        /// What went wrong
        reason: String,
    },

    /// The sink was unreachable, timed out or answered non-2xx
    #[error("delivery to {url} failed: {reason}")]
    Delivery {
        /// Sink URL
        url: String,
        /// Status returned by the sink, if any response arrived
        status: Option<u16>,
        /// What went wrong
        reason: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ScanError {
    /// Category reported in the run result.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Launch(_) | Self::Config(_) => ErrorKind::Launch,
            Self::Browser(err) => match err {
                BrowserError::LaunchFailed(_) => ErrorKind::Launch,
                BrowserError::NavigationTimeout { .. } => ErrorKind::NavigationTimeout,
                BrowserError::NavigationError(_) => ErrorKind::Navigation,
                BrowserError::SelectorTimeout { .. } => ErrorKind::SelectorTimeout,
                BrowserError::Evaluation(_)
                | BrowserError::SessionClosed
                | BrowserError::ChromiumError(_) => ErrorKind::Extraction,
            },
            Self::InvalidSelector { .. } | Self::Element { .. } => ErrorKind::Extraction,
            Self::Delivery { .. } => ErrorKind::Delivery,
        }
    }

    /// Sink status carried by a delivery failure.
    #[must_use]
    pub fn sink_status(&self) -> Option<u16> {
        match self {
            Self::Delivery { status, .. } => *status,
            _ => None,
        }
    }
}

/// Result type alias using `ScanError`.
pub type Result<T> = std::result::Result<T, ScanError>;
