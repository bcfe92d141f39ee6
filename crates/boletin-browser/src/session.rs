use crate::document::DocumentSnapshot;
use crate::error::{BrowserError, Result};
use std::time::Duration;

/// One live automation session bound to a single page.
///
/// A session belongs to exactly one run and is never shared.
#[async_trait::async_trait]
pub trait BrowserSession: Send + Sync {
    /// Load a URL and wait until network activity has gone quiet
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Wait for a selector to appear
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Capture the current document
    async fn snapshot(&self) -> Result<DocumentSnapshot>;

    /// Close the page and terminate the browser; later calls do nothing
    async fn release(&mut self);
}

/// Starts new sessions, one per run.
#[async_trait::async_trait]
pub trait SessionLauncher: Send + Sync {
    /// Launch an isolated browser and open one configured page
    async fn acquire(&self) -> Result<Box<dyn BrowserSession>>;
}

/// Helper to extract domain from URL
pub fn extract_domain(url: &str) -> Result<String> {
    let url = url::Url::parse(url)
        .map_err(|e| BrowserError::NavigationError(format!("Invalid URL: {}", e)))?;

    url.host_str()
        .ok_or_else(|| BrowserError::NavigationError("No host in URL".to_string()))
        .map(|s| s.to_string())
}
