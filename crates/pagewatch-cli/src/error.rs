//! Error types for the pagewatch CLI.
//!
//! Anything surfacing as a [`CliError`] means the invocation could not
//! complete; `main` renders it through miette and exits with status 2.
//! A check that runs and fails its policy is not an error.

use std::path::PathBuf;

use pagewatch_browser::BrowserError;
use pagewatch_core::HistoryError;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The browser could not be driven
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// The report to summarize could not be read
    #[error("Failed to read report {}: {reason}", .path.display())]
    ReportUnreadable {
        /// Report location
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// A result file could not be written
    #[error("Failed to write {}: {source}", .path.display())]
    Persist {
        /// Destination that could not be replaced
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Prior history was rejected as a whole
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors. Each names the offending field.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file given with --config doesn't exist
    #[error("Config file not found: {}\n\nHint: Check the --config path or remove the flag to use pagewatch.toml", .0.display())]
    NotFound(PathBuf),

    /// Config file extension is not recognised
    #[error("Unsupported config format: {}\n\nHint: Use a .toml or .json file", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Missing required configuration field
    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField {
        /// Name of the missing field
        field: String,
        /// Helpful hint for providing the field
        hint: String,
    },

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

impl ConfigError {
    /// The field this error is about, if it names one.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::MissingField { field, .. } | ConfigError::InvalidValue { field, .. } => {
                Some(field)
            }
            _ => None,
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        let field = if err.path.is_empty() {
            "configuration".to_string()
        } else {
            err.path.join(".")
        };
        ConfigError::InvalidValue {
            field,
            value: err.kind.to_string(),
            hint: "Check pagewatch.toml, PAGEWATCH_* and MONITOR_* variables, and flags".to_string(),
        }
    }
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Convert a `CliError` into a miette report for display.
pub fn cli_error_to_miette(err: CliError) -> miette::Report {
    match err {
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        CliError::Browser(BrowserError::LaunchFailed { reason, source }) => {
            let detail = source.map(|s| format!("\n{s}")).unwrap_or_default();
            miette::miette!(
                "Failed to launch Chrome: {}{}\n\nHint: Install Chrome/Chromium or pass --chrome-path",
                reason,
                detail
            )
        }
        other => miette::miette!("{}", other),
    }
}
