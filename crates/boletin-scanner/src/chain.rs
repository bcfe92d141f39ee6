use crate::error::Result;
use crate::strategy::Strategy;
use boletin_browser::{BrowserSession, DocumentSnapshot};
use boletin_core::{ExtractionConfig, ExtractionOutcome, Record};
use scraper::Html;
use std::time::Duration;
use url::Url;

/// Selector that must be present before extraction starts.
#[derive(Debug, Clone)]
pub struct ReadyWait {
    pub selector: String,
    pub timeout: Duration,
}

/// Ordered strategies evaluated against one settled document.
#[derive(Debug, Clone)]
pub struct StrategyChain {
    strategies: Vec<Strategy>,
    ready: Option<ReadyWait>,
}

impl StrategyChain {
    pub fn new(strategies: Vec<Strategy>) -> Self {
        Self {
            strategies,
            ready: None,
        }
    }

    /// Require `selector` to appear before extraction; expiry fails the run.
    #[must_use]
    pub fn with_ready_wait(mut self, selector: impl Into<String>, timeout: Duration) -> Self {
        self.ready = Some(ReadyWait {
            selector: selector.into(),
            timeout,
        });
        self
    }

    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let strategies = config
            .strategies
            .iter()
            .map(Strategy::compile)
            .collect::<Result<Vec<_>>>()?;

        let chain = Self::new(strategies);
        Ok(match &config.wait_for_selector {
            Some(selector) if !selector.trim().is_empty() => {
                chain.with_ready_wait(selector.clone(), config.selector_timeout())
            }
            _ => chain,
        })
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Run the chain against the session's current document.
    pub async fn extract(&self, session: &dyn BrowserSession) -> Result<ExtractionOutcome> {
        if let Some(ready) = &self.ready {
            tracing::debug!(selector = %ready.selector, timeout = ?ready.timeout, "waiting for listing markup");
            session
                .wait_for_selector(&ready.selector, ready.timeout)
                .await?;
        }

        let snapshot = session.snapshot().await?;
        Ok(self.evaluate(&snapshot))
    }

    /// Evaluate the chain against a captured document.
    ///
    /// The first strategy yielding at least one record wins; with none, the
    /// body text is returned as the fallback.
    pub fn evaluate(&self, snapshot: &DocumentSnapshot) -> ExtractionOutcome {
        let document = Html::parse_document(&snapshot.html);
        let base_url = Url::parse(&snapshot.url).ok();

        for strategy in &self.strategies {
            let matched: Vec<_> = document.select(strategy.container()).collect();
            if matched.is_empty() {
                tracing::debug!(strategy = strategy.name(), "no containers matched");
                continue;
            }

            let mut records: Vec<Record> = Vec::with_capacity(matched.len());
            for (index, element) in matched.iter().enumerate() {
                match strategy.extract(element, base_url.as_ref(), index) {
                    Ok(Some(record)) => records.push(record),
                    Ok(None) => {}
                    Err(e) => tracing::warn!(error = %e, "skipping element"),
                }
            }

            tracing::debug!(
                strategy = strategy.name(),
                matched = matched.len(),
                emitted = records.len(),
                "strategy evaluated"
            );

            if let Some(outcome) = ExtractionOutcome::structured(strategy.name(), records) {
                tracing::info!(
                    strategy = strategy.name(),
                    records = outcome.records().len(),
                    "structured extraction succeeded"
                );
                return outcome;
            }
        }

        if snapshot.body_text.trim().is_empty() {
            tracing::warn!(url = %snapshot.url, "no strategy matched and the page body is empty");
        } else {
            tracing::info!(
                chars = snapshot.body_text.chars().count(),
                "no strategy matched, falling back to page text"
            );
        }
        ExtractionOutcome::raw_text(snapshot.body_text.clone())
    }
}
