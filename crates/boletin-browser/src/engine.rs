use crate::document::DocumentSnapshot;
use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use crate::session::{extract_domain, BrowserSession, SessionLauncher};
use boletin_core::BrowserConfig;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromiumConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
    SetUserAgentOverrideParams,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::stream::StreamExt;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Interval between presence checks in `wait_for_selector`
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Upper bound on waiting for the browser process to exit after close
const EXIT_WAIT: Duration = Duration::from_secs(5);

const BODY_TEXT_SCRIPT: &str = "document.body ? document.body.innerText : ''";

/// Requests the page has started and not yet finished or failed.
///
/// Events arrive on separate streams, so a request may be seen finishing
/// before it is seen starting; such ids are remembered and cancel the
/// later start.
#[derive(Debug, Default)]
pub(crate) struct InFlightRequests {
    pending: HashSet<String>,
    settled_early: HashSet<String>,
}

impl InFlightRequests {
    /// Record a request start. Redirect hops reuse the id of the original
    /// request and are not counted again.
    pub(crate) fn started(&mut self, id: &str, redirect: bool) {
        if redirect || self.settled_early.remove(id) {
            return;
        }
        self.pending.insert(id.to_string());
    }

    /// Record a request that finished loading or failed.
    pub(crate) fn settled(&mut self, id: &str) {
        if !self.pending.remove(id) {
            self.settled_early.insert(id.to_string());
        }
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}

/// Launches one headless Chromium per session
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    settings: BrowserConfig,
    fingerprint: FingerprintConfig,
}

impl ChromiumLauncher {
    pub fn new(settings: &BrowserConfig) -> Self {
        Self {
            settings: settings.clone(),
            fingerprint: FingerprintConfig::from_config(settings),
        }
    }

    fn chromium_config(&self) -> Result<ChromiumConfig> {
        let mut builder = ChromiumConfig::builder()
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg(self.fingerprint.window_size_arg())
            .request_timeout(self.settings.navigation_timeout());

        if self.settings.no_sandbox {
            builder = builder.no_sandbox().arg("--disable-setuid-sandbox");
        }
        if !self.settings.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.settings.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(BrowserError::LaunchFailed)
    }

    async fn launch(&self) -> Result<ChromiumSession> {
        let config = self.chromium_config()?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        // Spawn browser handler
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!(error = %e, "CDP handler event error");
                }
            }
        });

        let mut session = ChromiumSession {
            browser: Some(browser),
            page: None,
            handler: Some(handler_task),
            quiescence: self.settings.quiescence_window(),
        };

        match session.open_page(&self.fingerprint).await {
            Ok(page) => {
                session.page = Some(page);
                Ok(session)
            }
            Err(e) => {
                session.release().await;
                Err(BrowserError::LaunchFailed(e.to_string()))
            }
        }
    }
}

#[async_trait::async_trait]
impl SessionLauncher for ChromiumLauncher {
    async fn acquire(&self) -> Result<Box<dyn BrowserSession>> {
        let started = Instant::now();
        let timeout = self.settings.launch_timeout();

        let session = tokio::time::timeout(timeout, self.launch())
            .await
            .map_err(|_| {
                BrowserError::LaunchFailed(format!("browser did not start within {timeout:?}"))
            })??;

        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            headless = self.settings.headless,
            "browser session acquired"
        );
        Ok(Box::new(session))
    }
}

/// One Chromium process with a single page
pub struct ChromiumSession {
    browser: Option<Browser>,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
    quiescence: Duration,
}

impl ChromiumSession {
    async fn open_page(&self, fingerprint: &FingerprintConfig) -> Result<Page> {
        let browser = self.browser.as_ref().ok_or(BrowserError::SessionClosed)?;
        let page = browser.new_page("about:blank").await?;
        page.execute(EnableParams::default()).await?;
        page.set_user_agent(SetUserAgentOverrideParams::new(
            fingerprint.user_agent.clone(),
        ))
        .await?;
        Ok(page)
    }

    fn page(&self) -> Result<&Page> {
        self.page.as_ref().ok_or(BrowserError::SessionClosed)
    }
}

async fn load_and_settle(
    page: &Page,
    url: &str,
    quiescence: Duration,
    timeout: Duration,
) -> Result<()> {
    // Subscribe before loading so no request of the navigation is missed
    let mut requests = page.event_listener::<EventRequestWillBeSent>().await?;
    let mut finished = page.event_listener::<EventLoadingFinished>().await?;
    let mut failed = page.event_listener::<EventLoadingFailed>().await?;

    page.goto(url).await.map_err(|e| match e {
        CdpError::Timeout => BrowserError::NavigationTimeout {
            url: url.to_string(),
            timeout,
        },
        other => BrowserError::NavigationError(other.to_string()),
    })?;

    let mut in_flight = InFlightRequests::default();
    let quiet = tokio::time::sleep(quiescence);
    tokio::pin!(quiet);

    // Settled once no request has been in flight for `quiescence`
    loop {
        tokio::select! {
            Some(event) = requests.next() => {
                in_flight.started(event.request_id.inner(), event.redirect_response.is_some());
            }
            Some(event) = finished.next() => in_flight.settled(event.request_id.inner()),
            Some(event) = failed.next() => in_flight.settled(event.request_id.inner()),
            () = &mut quiet, if in_flight.is_idle() => return Ok(()),
            else => return Err(BrowserError::SessionClosed),
        }

        if in_flight.is_idle() {
            quiet.as_mut().reset(tokio::time::Instant::now() + quiescence);
        } else {
            tracing::trace!(in_flight = in_flight.len(), "waiting for network to go quiet");
        }
    }
}

async fn poll_selector(page: &Page, check: &str) -> Result<()> {
    loop {
        let present: bool = page
            .evaluate(check)
            .await
            .map_err(|e| BrowserError::Evaluation(e.to_string()))?
            .into_value()
            .map_err(|e| BrowserError::Evaluation(e.to_string()))?;

        if present {
            return Ok(());
        }
        tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
    }
}

#[async_trait::async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        let domain = extract_domain(url)?;
        let page = self.page()?;
        let started = Instant::now();

        tracing::info!(%domain, %url, ?timeout, "navigating");
        let settle = load_and_settle(page, url, self.quiescence, timeout);
        match tokio::time::timeout(timeout, settle).await {
            Ok(result) => {
                result?;
                tracing::info!(
                    %domain,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "page settled"
                );
                Ok(())
            }
            Err(_) => Err(BrowserError::NavigationTimeout {
                url: url.to_string(),
                timeout,
            }),
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        let page = self.page()?;
        let literal =
            serde_json::to_string(selector).map_err(|e| BrowserError::Evaluation(e.to_string()))?;
        let check = format!("document.querySelector({literal}) !== null");

        tokio::time::timeout(timeout, poll_selector(page, &check))
            .await
            .map_err(|_| BrowserError::SelectorTimeout {
                selector: selector.to_string(),
                timeout,
            })?
    }

    async fn snapshot(&self) -> Result<DocumentSnapshot> {
        let page = self.page()?;

        let html = page
            .content()
            .await
            .map_err(|e| BrowserError::Evaluation(e.to_string()))?;
        let url = page.url().await?.unwrap_or_default();

        let body_text = match page.evaluate(BODY_TEXT_SCRIPT).await {
            Ok(result) => result.into_value::<String>().ok(),
            Err(e) => {
                tracing::warn!(error = %e, "innerText unavailable, deriving text from markup");
                None
            }
        };

        Ok(match body_text {
            Some(text) => DocumentSnapshot::new(url, html, text),
            None => DocumentSnapshot::from_html(url, html),
        })
    }

    async fn release(&mut self) {
        if self.browser.is_none() && self.page.is_none() {
            tracing::debug!("browser session already released");
            return;
        }

        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                tracing::debug!(error = %e, "page close failed");
            }
        }

        if let Some(mut browser) = self.browser.take() {
            match browser.close().await {
                Ok(_) => match tokio::time::timeout(EXIT_WAIT, browser.wait()).await {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => tracing::warn!(error = %e, "waiting for browser exit failed"),
                    Err(_) => tracing::warn!("browser did not exit within {:?}", EXIT_WAIT),
                },
                // Dropping the handle kills the child process
                Err(e) => tracing::warn!(error = %e, "browser close failed"),
            }
        }

        if let Some(handler) = self.handler.take() {
            handler.abort();
        }

        tracing::info!("browser session released");
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        let Some(mut browser) = self.browser.take() else {
            return;
        };

        tracing::warn!("browser session dropped without release, closing in background");
        let handler = self.handler.take();
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                let _ = browser.close().await;
                let _ = tokio::time::timeout(EXIT_WAIT, browser.wait()).await;
                if let Some(handler) = handler {
                    handler.abort();
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_request_blocks_idle() {
        let mut in_flight = InFlightRequests::default();
        assert!(in_flight.is_idle());

        in_flight.started("document", false);
        in_flight.settled("document");
        assert!(in_flight.is_idle());

        // A listing fetch issued after `load` keeps the page busy until it ends
        in_flight.started("listing-xhr", false);
        assert!(!in_flight.is_idle());
        assert_eq!(in_flight.len(), 1);

        in_flight.settled("listing-xhr");
        assert!(in_flight.is_idle());
    }

    #[test]
    fn test_settle_seen_before_start_is_not_left_pending() {
        let mut in_flight = InFlightRequests::default();
        in_flight.settled("img-1");
        in_flight.started("img-1", false);
        assert!(in_flight.is_idle());

        // The id is consumed; a new request reusing it counts again
        in_flight.started("img-1", false);
        assert!(!in_flight.is_idle());
    }

    #[test]
    fn test_redirect_hops_are_counted_once() {
        let mut in_flight = InFlightRequests::default();
        in_flight.started("doc", false);
        in_flight.started("doc", true);
        in_flight.settled("doc");
        assert!(in_flight.is_idle());

        let mut reordered = InFlightRequests::default();
        reordered.settled("doc");
        reordered.started("doc", false);
        reordered.started("doc", true);
        assert!(reordered.is_idle());
    }

    #[test]
    fn test_failed_request_settles() {
        let mut in_flight = InFlightRequests::default();
        in_flight.started("a", false);
        in_flight.started("b", false);
        in_flight.settled("a");
        assert!(!in_flight.is_idle());
        in_flight.settled("b");
        assert!(in_flight.is_idle());
    }

    #[test]
    fn test_launcher_applies_sandbox_flags() {
        let launcher = ChromiumLauncher::new(&BrowserConfig::default());
        assert!(launcher.chromium_config().is_ok());
    }
}
