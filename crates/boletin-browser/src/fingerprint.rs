use boletin_core::BrowserConfig;

/// Identity a session presents to the target site.
///
/// Fixed per deployment so runs are comparable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintConfig {
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl FingerprintConfig {
    /// Fingerprint described by the browser settings
    pub fn from_config(config: &BrowserConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            viewport_width: config.window_width,
            viewport_height: config.window_height,
        }
    }

    /// `--window-size` argument for Chromium
    pub fn window_size_arg(&self) -> String {
        format!(
            "--window-size={},{}",
            self.viewport_width, self.viewport_height
        )
    }
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self::from_config(&BrowserConfig::default())
    }
}
