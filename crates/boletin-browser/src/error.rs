use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("navigation to {url} did not settle within {timeout:?}")]
    NavigationTimeout { url: String, timeout: Duration },

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("selector {selector} did not appear within {timeout:?}")]
    SelectorTimeout { selector: String, timeout: Duration },

    #[error("page evaluation failed: {0}")]
    Evaluation(String),

    #[error("session already released")]
    SessionClosed,

    #[error("chromium error: {0}")]
    ChromiumError(String),
}

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Self::ChromiumError(err.to_string())
    }
}
