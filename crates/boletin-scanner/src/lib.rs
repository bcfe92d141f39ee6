//! Boletin Scanner - listing extraction and delivery.
//!
//! This crate turns one rendered listing page into one delivered payload.
//! It walks an ordered chain of selector strategies over the settled
//! document, falls back to the page text when none matches, normalizes the
//! result and posts it to the configured sink.
//!
//! # Features
//!
//! - Ordered strategy chain, first strategy with records wins
//! - Raw-text fallback so a markup change never fails a run
//! - Single timed delivery, no retry
//! - Session release on every exit path, with optional failure reports
//!
//! # Example
//!
//! ```rust,ignore
//! use boletin_browser::ChromiumLauncher;
//! use boletin_core::AppConfig;
//! use boletin_scanner::RunOrchestrator;
//! use std::sync::Arc;
//!
//! let config = AppConfig::load_with_env()?;
//! let launcher = Arc::new(ChromiumLauncher::new(&config.browser));
//! let orchestrator = RunOrchestrator::from_config(&config, launcher)?;
//!
//! let result = orchestrator.run().await;
//! println!("delivered {} records", result.record_count);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod chain;
pub mod delivery;
pub mod error;
pub mod normalizer;
pub mod orchestrator;
#[allow(missing_docs)]
pub mod strategy;

// Re-export commonly used types
pub use chain::StrategyChain;
pub use delivery::DeliveryClient;
pub use error::{Result, ScanError};
pub use normalizer::Normalizer;
pub use orchestrator::RunOrchestrator;
pub use strategy::Strategy;
