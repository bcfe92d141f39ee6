//! Run orchestrator for one extraction-and-delivery pass.
//!
//! This module provides the `RunOrchestrator` which acquires a browser
//! session, drives it through navigation, extraction, normalization and
//! delivery, and releases it on every exit path before reporting.

use crate::chain::StrategyChain;
use crate::delivery::DeliveryClient;
use crate::error::{Result, ScanError};
use crate::normalizer::Normalizer;
use boletin_browser::{BrowserSession, SessionLauncher};
use boletin_core::{AppConfig, FailureReport, RunPhase, RunResult, Timestamp};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Sequences one run: acquire, navigate, extract, normalize, deliver, release.
///
/// Holds no per-run state; concurrent calls to [`run`](Self::run) each get
/// their own session.
pub struct RunOrchestrator {
    /// Starts one browser session per run
    launcher: Arc<dyn SessionLauncher>,
    /// Ordered extraction strategies
    chain: StrategyChain,
    /// Payload builder
    normalizer: Normalizer,
    /// Sink client
    delivery: DeliveryClient,
    /// Listing page
    target_url: String,
    /// Source identifier for failure reports
    source_id: String,
    /// Page settle budget
    navigation_timeout: Duration,
    /// Send failure details to the sink
    report_failures: bool,
}

impl RunOrchestrator {
    /// Create a new run orchestrator.
    #[must_use]
    pub fn new(
        launcher: Arc<dyn SessionLauncher>,
        chain: StrategyChain,
        normalizer: Normalizer,
        delivery: DeliveryClient,
        target_url: impl Into<String>,
        source_id: impl Into<String>,
    ) -> Self {
        Self {
            launcher,
            chain,
            normalizer,
            delivery,
            target_url: target_url.into(),
            source_id: source_id.into(),
            navigation_timeout: Duration::from_secs(60),
            report_failures: false,
        }
    }

    /// Build an orchestrator from validated configuration.
    pub fn from_config(config: &AppConfig, launcher: Arc<dyn SessionLauncher>) -> Result<Self> {
        config.validate()?;

        let chain = StrategyChain::from_config(&config.extraction)?;
        let normalizer = Normalizer::new(
            config.target.source_id.clone(),
            config.extraction.preview_chars,
        );
        let delivery = DeliveryClient::from_config(&config.delivery)?;

        Ok(Self::new(
            launcher,
            chain,
            normalizer,
            delivery,
            config.target.url.clone(),
            config.target.source_id.clone(),
        )
        .with_navigation_timeout(config.browser.navigation_timeout())
        .with_failure_reports(config.delivery.report_failures))
    }

    /// Set the page settle budget.
    #[must_use]
    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Enable or disable best-effort failure reports to the sink.
    #[must_use]
    pub fn with_failure_reports(mut self, enabled: bool) -> Self {
        self.report_failures = enabled;
        self
    }

    /// Execute one run and report its outcome.
    ///
    /// Never returns early without releasing an acquired session; failures
    /// are folded into the returned [`RunResult`].
    pub async fn run(&self) -> RunResult {
        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("run", %run_id, target = %self.target_url);
        self.run_inner().instrument(span).await
    }

    async fn run_inner(&self) -> RunResult {
        let started = Instant::now();
        let mut phase = RunPhase::Idle;

        transition(&mut phase, RunPhase::Acquiring);
        let mut session = match self.launcher.acquire().await {
            Ok(session) => session,
            Err(e) => return self.fail(&mut phase, ScanError::Launch(e)).await,
        };

        let outcome = self.drive(session.as_mut(), &mut phase).await;
        session.release().await;

        match outcome {
            Ok(result) => {
                transition(&mut phase, RunPhase::Done);
                tracing::info!(
                    records = result.record_count,
                    outcome = ?result.outcome_kind,
                    sink_status = ?result.sink_status,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "run completed"
                );
                result
            }
            Err(e) => self.fail(&mut phase, e).await,
        }
    }

    /// Steps between acquisition and release.
    async fn drive(
        &self,
        session: &mut dyn BrowserSession,
        phase: &mut RunPhase,
    ) -> Result<RunResult> {
        transition(phase, RunPhase::Navigating);
        session
            .navigate(&self.target_url, self.navigation_timeout)
            .await?;

        transition(phase, RunPhase::Extracting);
        let outcome = self.chain.extract(&*session).await?;

        transition(phase, RunPhase::Normalizing);
        let payload = self.normalizer.normalize(outcome);

        transition(phase, RunPhase::Delivering);
        let status = self.delivery.deliver(&payload).await?;

        Ok(RunResult::delivered(&payload, status))
    }

    /// Move the run to `Failed` and report it. The session, if any, is
    /// already released; the result keeps the phase that failed.
    async fn fail(&self, phase: &mut RunPhase, error: ScanError) -> RunResult {
        let failed_phase = *phase;
        transition(phase, RunPhase::Failed);

        let kind = error.kind();
        let message = error.to_string();
        tracing::error!(phase = %failed_phase, error_kind = %kind, error = %message, "run failed");

        if self.report_failures {
            let report = FailureReport {
                error: kind,
                mensaje: message.clone(),
                fase: failed_phase,
                timestamp: Timestamp::now(),
                source: self.source_id.clone(),
            };
            // Best effort: a failed report never changes the run result
            if let Err(e) = self.delivery.report_failure(&report).await {
                tracing::warn!(error = %e, "failure report not delivered");
            }
        }

        RunResult::failed(kind, message, failed_phase, error.sink_status())
    }
}

fn transition(phase: &mut RunPhase, next: RunPhase) {
    tracing::debug!(from = %phase, to = %next, "run phase");
    *phase = next;
}
