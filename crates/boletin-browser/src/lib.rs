//! Browser sessions for client-side rendered pages.
//!
//! Provides a headless Chromium session per run: launch with sandboxing
//! disabled, navigate and wait for the network to go quiet, capture a
//! read-only snapshot of the settled document, and release exactly once.

pub mod document;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod session;

pub use document::DocumentSnapshot;
pub use engine::{ChromiumLauncher, ChromiumSession};
pub use error::{BrowserError, Result};
pub use fingerprint::FingerprintConfig;
pub use session::{BrowserSession, SessionLauncher};
