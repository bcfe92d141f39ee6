//! Shared types used across the boletin pipeline.
//!
//! This module defines the record model produced by extraction, the wire
//! payload sent to the sink and the terminal value of a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date label used when a record carries none.
pub const DATE_UNAVAILABLE: &str = "date unavailable";

/// One extracted item of the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Title text, never empty once emitted by extraction
    pub title: String,
    /// Free-form date/label text as presented by the page
    pub published_label: String,
    /// Absolute document URL
    pub document_url: Option<String>,
}

/// Which branch of the strategy chain produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeKind {
    /// At least one strategy matched
    Structured,
    /// No strategy matched; the page text was captured instead
    RawText,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured => write!(f, "Structured"),
            Self::RawText => write!(f, "RawText"),
        }
    }
}

/// Titled records in document order; never empty.
///
/// The only way to obtain one is [`TitledRecords::new`], so holding a value
/// proves at least one record with a title exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitledRecords(Vec<Record>);

impl TitledRecords {
    /// Keep the titled records; `None` when none remain.
    #[must_use]
    pub fn new(records: Vec<Record>) -> Option<Self> {
        let records: Vec<Record> = records
            .into_iter()
            .filter(|r| !r.title.trim().is_empty())
            .collect();

        if records.is_empty() {
            None
        } else {
            Some(Self(records))
        }
    }

    /// Records as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Record] {
        &self.0
    }

    /// Number of records, at least one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with slices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Take the records out.
    #[must_use]
    pub fn into_vec(self) -> Vec<Record> {
        self.0
    }
}

/// Result of running the strategy chain over one document.
///
/// A `Structured` outcome always carries at least one titled record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// Records captured by the named strategy, in document order
    Structured {
        /// Strategy that produced the records
        strategy: String,
        /// Non-empty record list
        records: TitledRecords,
    },
    /// Full visible text of the document body
    RawText {
        /// Captured text, possibly empty when the page had none
        text: String,
    },
}

impl ExtractionOutcome {
    /// Build a structured outcome, dropping untitled records.
    ///
    /// Returns `None` when no titled record remains.
    #[must_use]
    pub fn structured(strategy: impl Into<String>, records: Vec<Record>) -> Option<Self> {
        TitledRecords::new(records).map(|records| Self::Structured {
            strategy: strategy.into(),
            records,
        })
    }

    /// Build the raw-text fallback outcome.
    #[must_use]
    pub fn raw_text(text: impl Into<String>) -> Self {
        Self::RawText { text: text.into() }
    }

    /// Kind matching the populated field.
    #[must_use]
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Structured { .. } => OutcomeKind::Structured,
            Self::RawText { .. } => OutcomeKind::RawText,
        }
    }

    /// Extracted records; empty for raw text.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        match self {
            Self::Structured { records, .. } => records.as_slice(),
            Self::RawText { .. } => &[],
        }
    }

    /// Captured text; `None` for structured outcomes.
    #[must_use]
    pub fn raw_text_content(&self) -> Option<&str> {
        match self {
            Self::Structured { .. } => None,
            Self::RawText { text } => Some(text),
        }
    }

    /// Name of the winning strategy, if any.
    #[must_use]
    pub fn strategy(&self) -> Option<&str> {
        match self {
            Self::Structured { strategy, .. } => Some(strategy),
            Self::RawText { .. } => None,
        }
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
///
/// Serializes as an RFC 3339 string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Format as RFC3339 string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

/// One record as the sink receives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadRecord {
    /// Record title
    pub titulo: String,
    /// Date label, `"date unavailable"` when the page had none
    pub publicado: String,
    /// Document URL, serialized as `null` when absent
    #[serde(rename = "documentoUrl")]
    pub documento_url: Option<String>,
}

impl From<Record> for PayloadRecord {
    fn from(record: Record) -> Self {
        let publicado = if record.published_label.trim().is_empty() {
            DATE_UNAVAILABLE.to_string()
        } else {
            record.published_label
        };
        let documento_url = record.document_url.filter(|url| !url.trim().is_empty());

        Self {
            titulo: record.title,
            publicado,
            documento_url,
        }
    }
}

/// Wire body posted to the sink.
///
/// Exactly one of `comunicados` or `contenido` is present. Fields are
/// private so a payload cannot change after it is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comunicados: Option<Vec<PayloadRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    contenido: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cantidad: Option<usize>,
    timestamp: Timestamp,
    source: String,
}

impl DeliveryPayload {
    /// Payload carrying structured records.
    #[must_use]
    pub fn structured(
        records: Vec<PayloadRecord>,
        source: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            cantidad: Some(records.len()),
            comunicados: Some(records),
            contenido: None,
            timestamp,
            source: source.into(),
        }
    }

    /// Payload carrying the raw page text.
    #[must_use]
    pub fn raw_text(text: impl Into<String>, source: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            comunicados: None,
            contenido: Some(text.into()),
            cantidad: None,
            timestamp,
            source: source.into(),
        }
    }

    /// Kind of content carried.
    #[must_use]
    pub fn kind(&self) -> OutcomeKind {
        if self.comunicados.is_some() {
            OutcomeKind::Structured
        } else {
            OutcomeKind::RawText
        }
    }

    /// Structured records; empty for raw text.
    #[must_use]
    pub fn records(&self) -> &[PayloadRecord] {
        self.comunicados.as_deref().unwrap_or_default()
    }

    /// Raw page text, if this is a fallback payload.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.contenido.as_deref()
    }

    /// Number of structured records.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records().len()
    }

    /// Generation time.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Source identifier.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Failure category of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The browser process could not start
    #[serde(rename = "LaunchFailure")]
    Launch,
    /// The page did not settle within its budget
    #[serde(rename = "NavigationTimeoutError")]
    NavigationTimeout,
    /// The page could not be loaded at all
    #[serde(rename = "NavigationError")]
    Navigation,
    /// The expected structure never appeared
    #[serde(rename = "SelectorTimeoutError")]
    SelectorTimeout,
    /// The document could not be read
    #[serde(rename = "ExtractionError")]
    Extraction,
    /// The sink was unreachable, slow or answered non-2xx
    #[serde(rename = "DeliveryError")]
    Delivery,
}

impl ErrorKind {
    /// Name used on the wire and in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Launch => "LaunchFailure",
            Self::NavigationTimeout => "NavigationTimeoutError",
            Self::Navigation => "NavigationError",
            Self::SelectorTimeout => "SelectorTimeoutError",
            Self::Extraction => "ExtractionError",
            Self::Delivery => "DeliveryError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Step of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunPhase {
    /// Not started
    Idle,
    /// Launching the browser
    Acquiring,
    /// Loading the page
    Navigating,
    /// Running the strategy chain
    Extracting,
    /// Building the payload
    Normalizing,
    /// Posting to the sink
    Delivering,
    /// Delivered
    Done,
    /// Terminal failure
    Failed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Terminal value of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    /// Whether the payload reached the sink
    pub success: bool,
    /// Structured records delivered; 0 for raw text and failures
    pub record_count: usize,
    /// Branch of the chain that produced the payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome_kind: Option<OutcomeKind>,
    /// HTTP status returned by the sink
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sink_status: Option<u16>,
    /// Failure category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// Underlying failure message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Phase that failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_phase: Option<RunPhase>,
    /// Length in characters of the raw text delivered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_length: Option<usize>,
}

impl RunResult {
    /// Result of a delivered run.
    #[must_use]
    pub fn delivered(payload: &DeliveryPayload, sink_status: u16) -> Self {
        Self {
            success: true,
            record_count: payload.record_count(),
            outcome_kind: Some(payload.kind()),
            sink_status: Some(sink_status),
            error_kind: None,
            error_message: None,
            failed_phase: None,
            content_length: payload.content().map(|text| text.chars().count()),
        }
    }

    /// Result of a failed run.
    #[must_use]
    pub fn failed(
        kind: ErrorKind,
        message: impl Into<String>,
        phase: RunPhase,
        sink_status: Option<u16>,
    ) -> Self {
        Self {
            success: false,
            record_count: 0,
            outcome_kind: None,
            sink_status,
            error_kind: Some(kind),
            error_message: Some(message.into()),
            failed_phase: Some(phase),
            content_length: None,
        }
    }
}

/// Best-effort diagnostic body sent to the sink when a run fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    /// Failure category
    pub error: ErrorKind,
    /// Failure message
    pub mensaje: String,
    /// Phase that failed
    pub fase: RunPhase,
    /// Report time
    pub timestamp: Timestamp,
    /// Source identifier
    pub source: String,
}
