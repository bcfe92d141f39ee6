//! Boletin Core - Foundation crate for the boletin extraction pipeline.
//!
//! This crate provides the record model, the run result vocabulary, error
//! handling and configuration management that the other boletin crates
//! depend on.
//!
//! # Modules
//!
//! - [`error`] - Configuration error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Records, extraction outcomes, delivery payloads and run results
//!
//! # Example
//!
//! ```rust
//! use boletin_core::{AppConfig, ExtractionOutcome, OutcomeKind};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! config.validate()?;
//!
//! let outcome = ExtractionOutcome::raw_text("page text");
//! assert_eq!(outcome.kind(), OutcomeKind::RawText);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, BrowserConfig, DeliveryConfig, ExtractionConfig, ServerConfig, StrategyConfig,
    TargetConfig,
};
pub use error::{ConfigError, ConfigResult};
pub use types::{
    DeliveryPayload, ErrorKind, ExtractionOutcome, FailureReport, OutcomeKind, PayloadRecord,
    Record, RunPhase, RunResult, Timestamp, TitledRecords, DATE_UNAVAILABLE,
};
