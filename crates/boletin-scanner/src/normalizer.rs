//! Maps extraction outcomes onto the sink's payload shape.

use boletin_core::{DeliveryPayload, ExtractionOutcome, PayloadRecord, Timestamp};

/// Builds delivery payloads stamped with a fixed source identifier.
#[derive(Debug, Clone)]
pub struct Normalizer {
    source_id: String,
    preview_chars: usize,
}

impl Normalizer {
    /// Create a normalizer for `source_id`, echoing at most `preview_chars`
    /// characters of raw text to the log.
    #[must_use]
    pub fn new(source_id: impl Into<String>, preview_chars: usize) -> Self {
        Self {
            source_id: source_id.into(),
            preview_chars,
        }
    }

    /// Build the payload for an outcome, stamped with the current time.
    ///
    /// Structured records get policy defaults for missing fields. Raw text
    /// is forwarded in full; only the logged preview is truncated.
    #[must_use]
    pub fn normalize(&self, outcome: ExtractionOutcome) -> DeliveryPayload {
        let timestamp = Timestamp::now();

        match outcome {
            ExtractionOutcome::Structured { strategy, records } => {
                let records: Vec<PayloadRecord> = records
                    .into_vec()
                    .into_iter()
                    .map(PayloadRecord::from)
                    .collect();
                tracing::debug!(%strategy, records = records.len(), "normalized structured outcome");
                DeliveryPayload::structured(records, self.source_id.as_str(), timestamp)
            }
            ExtractionOutcome::RawText { text } => {
                tracing::info!(
                    chars = text.chars().count(),
                    preview = %self.preview(&text),
                    "normalized raw text outcome"
                );
                DeliveryPayload::raw_text(text, self.source_id.as_str(), timestamp)
            }
        }
    }

    /// Leading `preview_chars` characters of `text`, with an ellipsis when cut.
    #[must_use]
    pub fn preview(&self, text: &str) -> String {
        match text.char_indices().nth(self.preview_chars) {
            Some((cut, _)) => format!("{}…", &text[..cut]),
            None => text.to_string(),
        }
    }
}
