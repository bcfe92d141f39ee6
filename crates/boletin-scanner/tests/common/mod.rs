//! Scripted browser sessions for exercising runs without Chrome.

#![allow(dead_code)]

use async_trait::async_trait;
use boletin_browser::{BrowserError, BrowserSession, DocumentSnapshot, Result, SessionLauncher};
use boletin_core::AppConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const PAGE_URL: &str = "https://www.corteconstitucional.gov.co/comunicados";

/// How the scripted page behaves on navigation.
#[derive(Debug, Clone, Copy)]
pub enum Navigation {
    Settles,
    TimesOut,
    Fails,
}

/// Launcher handing out scripted sessions and counting their lifecycle.
#[derive(Clone)]
pub struct FixtureLauncher {
    html: String,
    navigation: Navigation,
    selector_present: bool,
    pub acquired: Arc<AtomicUsize>,
    pub released: Arc<AtomicUsize>,
}

impl FixtureLauncher {
    pub fn with_body(body: &str) -> Self {
        Self {
            html: format!("<html><head><title>Comunicados</title></head><body>{body}</body></html>"),
            navigation: Navigation::Settles,
            selector_present: true,
            acquired: Arc::new(AtomicUsize::new(0)),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn navigation(mut self, navigation: Navigation) -> Self {
        self.navigation = navigation;
        self
    }

    pub fn selector_missing(mut self) -> Self {
        self.selector_present = false;
        self
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionLauncher for FixtureLauncher {
    async fn acquire(&self) -> Result<Box<dyn BrowserSession>> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FixtureSession {
            html: self.html.clone(),
            navigation: self.navigation,
            selector_present: self.selector_present,
            loaded: None,
            released: Arc::clone(&self.released),
            closed: false,
        }))
    }
}

struct FixtureSession {
    html: String,
    navigation: Navigation,
    selector_present: bool,
    loaded: Option<String>,
    released: Arc<AtomicUsize>,
    closed: bool,
}

#[async_trait]
impl BrowserSession for FixtureSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        if self.closed {
            return Err(BrowserError::SessionClosed);
        }
        match self.navigation {
            Navigation::Settles => {
                self.loaded = Some(url.to_string());
                Ok(())
            }
            Navigation::TimesOut => Err(BrowserError::NavigationTimeout {
                url: url.to_string(),
                timeout,
            }),
            Navigation::Fails => Err(BrowserError::NavigationError(
                "net::ERR_NAME_NOT_RESOLVED".to_string(),
            )),
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        if self.selector_present {
            Ok(())
        } else {
            Err(BrowserError::SelectorTimeout {
                selector: selector.to_string(),
                timeout,
            })
        }
    }

    async fn snapshot(&self) -> Result<DocumentSnapshot> {
        let url = self.loaded.as_deref().ok_or(BrowserError::SessionClosed)?;
        Ok(DocumentSnapshot::from_html(url, self.html.clone()))
    }

    async fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Configuration pointing at `sink_url`, with short timeouts.
pub fn config_for(sink_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.target.url = PAGE_URL.to_string();
    config.delivery.sink_url = sink_url.to_string();
    config.delivery.timeout_secs = 2;
    config
}

pub const THREE_ROWS: &str = r#"
<h1>Comunicados de prensa</h1>
<table>
  <thead><tr><th>Fecha</th><th>Comunicado</th><th>Documento</th></tr></thead>
  <tbody>
    <tr><td>7 de febrero de 2024</td><td>Comunicado No. 4</td><td><a href="/comunicados/No.%204.pdf">PDF</a></td></tr>
    <tr><td>14 de febrero de 2024</td><td>Comunicado No. 5</td><td><a href="/comunicados/No.%205.pdf">PDF</a></td></tr>
    <tr><td></td><td>Comunicado No. 6</td><td></td></tr>
  </tbody>
</table>
"#;

pub const NO_LISTING: &str = r#"
<h1>Comunicados</h1>
<p>El listado se encuentra en mantenimiento.</p>
<script>window.analytics = {};</script>
"#;
