//! Error types for reading persisted pagewatch data.

use thiserror::Error;

/// Reasons a prior history source could not be used.
///
/// Callers merging history treat every variant the same way (as an empty
/// history); the variants exist so the cause can be logged.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The source was valid JSON but not an array.
    #[error("history source is not a JSON array (found {found})")]
    NotAnArray {
        /// JSON type name of the top-level value
        found: &'static str,
    },

    /// The source was not valid JSON.
    #[error("history source is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for history parsing.
pub type Result<T> = std::result::Result<T, HistoryError>;
