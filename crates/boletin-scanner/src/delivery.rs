//! HTTP delivery of payloads to the configured sink.

use crate::error::{Result, ScanError};
use boletin_core::{DeliveryConfig, DeliveryPayload, FailureReport};
use reqwest::Client;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Posts JSON bodies to one sink, once per call.
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    client: Client,
    sink_url: String,
    timeout: Duration,
}

impl DeliveryClient {
    /// Create a client for `sink_url` with a per-request timeout.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(sink_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let sink_url = sink_url.into();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScanError::Delivery {
                url: sink_url.clone(),
                status: None,
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            sink_url,
            timeout,
        })
    }

    /// Create a client from the delivery settings.
    pub fn from_config(config: &DeliveryConfig) -> Result<Self> {
        Self::new(config.sink_url.clone(), config.timeout())
    }

    /// Sink URL this client posts to.
    #[must_use]
    pub fn sink_url(&self) -> &str {
        &self.sink_url
    }

    /// Deliver a payload; returns the sink's 2xx status.
    ///
    /// No retry is attempted.
    pub async fn deliver(&self, payload: &DeliveryPayload) -> Result<u16> {
        self.post_json(payload).await
    }

    /// Send a failure report to the sink.
    pub async fn report_failure(&self, report: &FailureReport) -> Result<u16> {
        self.post_json(report).await
    }

    async fn post_json<T>(&self, body: &T) -> Result<u16>
    where
        T: Serialize + ?Sized + Sync,
    {
        let started = Instant::now();

        let response = self
            .client
            .post(&self.sink_url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    format!("no response within {:?}", self.timeout)
                } else {
                    format!("request failed: {e}")
                };
                self.failure(e.status().map(|s| s.as_u16()), reason)
            })?;

        let status = response.status();
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                sink = %self.sink_url,
                status = status.as_u16(),
                elapsed_ms,
                "sink rejected payload"
            );
            return Err(self.failure(
                Some(status.as_u16()),
                format!("sink answered {status}: {}", body.chars().take(200).collect::<String>()),
            ));
        }

        tracing::info!(sink = %self.sink_url, status = status.as_u16(), elapsed_ms, "payload delivered");
        Ok(status.as_u16())
    }

    fn failure(&self, status: Option<u16>, reason: String) -> ScanError {
        ScanError::Delivery {
            url: self.sink_url.clone(),
            status,
            reason,
        }
    }
}
