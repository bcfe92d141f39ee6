//! Configuration management for boletin.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. Every section falls back to defaults
//! that target the Constitutional Court communiqué listing.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "BOLETIN_CONFIG";

/// Default listing page.
pub const DEFAULT_TARGET_URL: &str = "https://www.corteconstitucional.gov.co/comunicados";

/// Default sink used when no sink URL is configured.
pub const DEFAULT_SINK_URL: &str = "https://lab.irradialab.com/webhook/recibir-comunicados";

/// Desktop Chrome user agent sent by every session.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main application configuration.
///
/// Loaded from `$BOLETIN_CONFIG` or `~/.config/boletin/config.toml`
/// (or platform equivalent). If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Page to extract from
    pub target: TargetConfig,
    /// Browser session settings
    pub browser: BrowserConfig,
    /// Strategy chain settings
    pub extraction: ExtractionConfig,
    /// Sink settings
    pub delivery: DeliveryConfig,
    /// HTTP trigger settings
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - `BOLETIN_CONFIG` names a file that does not exist
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(explicit);
            if !path.exists() {
                return Err(ConfigError::NotFound {
                    path: path.display().to_string(),
                });
            }
            return Self::load_from(&path);
        }

        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific TOML file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `BOLETIN_TARGET_URL`: Override the listing page URL
    /// - `BOLETIN_SINK_URL`: Override the delivery sink URL
    /// - `BOLETIN_NAVIGATION_TIMEOUT_SECS`: Override the page settle budget
    /// - `BOLETIN_DELIVERY_TIMEOUT_SECS`: Override the sink request timeout
    /// - `BOLETIN_CHROME_PATH`: Use a specific Chrome/Chromium binary
    /// - `BOLETIN_REPORT_FAILURES`: Send failure details to the sink (true/false)
    /// - `PORT`: Override the HTTP trigger port
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    ///
    /// Values that fail to parse are ignored, matching how a missing
    /// variable is treated.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("BOLETIN_TARGET_URL").filter(|v| !v.trim().is_empty()) {
            tracing::debug!("Override target.url from env: {}", url);
            self.target.url = url;
        }

        if let Some(url) = lookup("BOLETIN_SINK_URL").filter(|v| !v.trim().is_empty()) {
            tracing::debug!("Override delivery.sink_url from env: {}", url);
            self.delivery.sink_url = url;
        }

        if let Some(secs) = lookup("BOLETIN_NAVIGATION_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.browser.navigation_timeout_secs = secs;
            tracing::debug!("Override browser.navigation_timeout_secs from env: {}", secs);
        }

        if let Some(secs) = lookup("BOLETIN_DELIVERY_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.delivery.timeout_secs = secs;
            tracing::debug!("Override delivery.timeout_secs from env: {}", secs);
        }

        if let Some(path) = lookup("BOLETIN_CHROME_PATH").filter(|v| !v.trim().is_empty()) {
            tracing::debug!("Override browser.chrome_executable from env: {}", path);
            self.browser.chrome_executable = Some(PathBuf::from(path));
        }

        if let Some(report) = lookup("BOLETIN_REPORT_FAILURES").and_then(|v| v.parse().ok()) {
            self.delivery.report_failures = report;
            tracing::debug!("Override delivery.report_failures from env: {}", report);
        }

        if let Some(port) = lookup("PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
            tracing::debug!("Override server.port from env: {}", port);
        }
    }

    /// Check values that would otherwise only fail in the middle of a run.
    pub fn validate(&self) -> ConfigResult<()> {
        check_http_url("target.url", &self.target.url)?;
        check_http_url("delivery.sink_url", &self.delivery.sink_url)?;

        if self.target.source_id.trim().is_empty() {
            return Err(ConfigError::invalid("target.source_id", "must not be empty"));
        }

        for (field, value) in [
            ("browser.launch_timeout_secs", self.browser.launch_timeout_secs),
            ("browser.navigation_timeout_secs", self.browser.navigation_timeout_secs),
            ("extraction.selector_timeout_secs", self.extraction.selector_timeout_secs),
            ("delivery.timeout_secs", self.delivery.timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::invalid(field, "must be greater than zero"));
            }
        }

        if self.extraction.strategies.is_empty() {
            return Err(ConfigError::invalid(
                "extraction.strategies",
                "at least one strategy is required",
            ));
        }

        for strategy in &self.extraction.strategies {
            if strategy.container.trim().is_empty() {
                return Err(ConfigError::invalid(
                    "extraction.strategies.container",
                    format!("strategy '{}' has an empty container selector", strategy.name),
                ));
            }
        }

        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/boletin/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("co", "boletin", "boletin").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn check_http_url(field: &str, value: &str) -> ConfigResult<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| ConfigError::invalid(field, format!("'{value}' is not a URL: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::invalid(
            field,
            format!("scheme '{other}' is not supported, use http or https"),
        )),
    }
}

/// Listing page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// URL of the listing page
    pub url: String,
    /// Identifier stamped on every payload as `source`
    pub source_id: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_TARGET_URL.to_string(),
            source_id: "corteconstitucional.gov.co/comunicados".to_string(),
        }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Disable the Chromium sandbox (required inside containers)
    pub no_sandbox: bool,
    /// Explicit Chrome/Chromium binary; auto-detected when unset
    pub chrome_executable: Option<PathBuf>,
    /// User agent set on the page after launch
    pub user_agent: String,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Budget for launching the browser and opening the page
    pub launch_timeout_secs: u64,
    /// Budget for loading the page and letting the network settle
    pub navigation_timeout_secs: u64,
    /// How long network activity must stay quiet before the page counts as settled
    pub quiescence_ms: u64,
}

impl BrowserConfig {
    /// Launch budget as a [`Duration`].
    #[must_use]
    pub fn launch_timeout(&self) -> Duration {
        Duration::from_secs(self.launch_timeout_secs)
    }

    /// Navigation budget as a [`Duration`].
    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    /// Quiescence window as a [`Duration`].
    #[must_use]
    pub fn quiescence_window(&self) -> Duration {
        Duration::from_millis(self.quiescence_ms)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            no_sandbox: true,
            chrome_executable: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            window_width: 1920,
            window_height: 1080,
            launch_timeout_secs: 30,
            navigation_timeout_secs: 60,
            quiescence_ms: 500,
        }
    }
}

/// One structured-extraction recipe.
///
/// Sub-selectors are evaluated inside each matched container. A missing
/// `title` uses the container's own text and a missing `link` uses the
/// container's own `href`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Name used in logs
    pub name: String,
    /// Selector for one record's container element
    pub container: String,
    /// Selector for the title inside the container
    #[serde(default)]
    pub title: Option<String>,
    /// Selector for the date label inside the container
    #[serde(default)]
    pub date: Option<String>,
    /// Selector for the document link inside the container
    #[serde(default)]
    pub link: Option<String>,
}

impl StrategyConfig {
    /// Built-in chain, most precise first.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self {
                name: "table-rows".to_string(),
                container: "table tbody tr".to_string(),
                title: Some("td.titulo, td.views-field-title, td:nth-of-type(2)".to_string()),
                date: Some("td.fecha, td time, td:nth-of-type(1)".to_string()),
                link: Some("a[href]".to_string()),
            },
            Self {
                name: "listing-cards".to_string(),
                container: ".views-row, .comunicado, article".to_string(),
                title: Some("h2, h3, h4, .titulo, .title".to_string()),
                date: Some("time, .fecha, .date, .date-display-single".to_string()),
                link: Some("a[href$='.pdf'], a[href]".to_string()),
            },
            Self {
                name: "document-links".to_string(),
                container: "a[href$='.pdf']".to_string(),
                title: None,
                date: None,
                link: None,
            },
        ]
    }
}

/// Strategy chain settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Selector that must be present before extraction starts (e.g. `table tbody tr`)
    pub wait_for_selector: Option<String>,
    /// Budget for `wait_for_selector`
    pub selector_timeout_secs: u64,
    /// Characters of raw text echoed to logs
    pub preview_chars: usize,
    /// Ordered strategies, highest priority first
    pub strategies: Vec<StrategyConfig>,
}

impl ExtractionConfig {
    /// Selector wait budget as a [`Duration`].
    #[must_use]
    pub fn selector_timeout(&self) -> Duration {
        Duration::from_secs(self.selector_timeout_secs)
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            wait_for_selector: None,
            selector_timeout_secs: 15,
            preview_chars: 500,
            strategies: StrategyConfig::defaults(),
        }
    }
}

/// Sink settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Endpoint receiving the payload
    pub sink_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Send a best-effort failure report to the sink when a run fails
    pub report_failures: bool,
}

impl DeliveryConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            sink_url: DEFAULT_SINK_URL.to_string(),
            timeout_secs: 30,
            report_failures: false,
        }
    }
}

/// HTTP trigger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}
