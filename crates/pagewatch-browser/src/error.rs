//! Error types for browser session operations.
//!
//! Every variant here means the page could not be observed at all. Findings
//! about the page itself (bad status, script errors, missing text) are never
//! errors; they are data handed to the classifier.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowserError {
    /// Chrome could not be started: missing executable, bad flags, or a
    /// sandbox refusing to run.
    #[error("failed to launch browser: {reason}")]
    LaunchFailed {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A tab could not be opened or closed over the `DevTools` connection.
    #[error("CDP connection failed: {0}")]
    ConnectionFailed(String),

    /// DNS or connection failure, or no DOMContentLoaded within the
    /// navigation timeout.
    #[error("navigation to '{url}' failed: {reason}")]
    NavigationFailed { url: String, reason: String },

    #[error("gave up waiting for {condition} after {timeout:?}")]
    WaitTimeout { condition: String, timeout: Duration },

    /// The rendered markup could not be read after load.
    #[error("failed to read page content: {0}")]
    ContentUnavailable(String),

    /// The task draining page events stopped unexpectedly.
    #[error("event pipeline failed: {0}")]
    EventPipeline(String),

    #[error("browser already closed")]
    AlreadyClosed,

    #[error("CDP error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),
}

pub type Result<T> = std::result::Result<T, BrowserError>;
