//! # pagewatch-core
//!
//! The browser-independent half of pagewatch: turning the signals observed
//! while a page loads into a deterministic pass/fail verdict, and folding
//! successive verdicts into a bounded rolling history.
//!
//! ## Architecture
//!
//! - **Diagnostics**: typed records for page errors, console messages and
//!   failed requests, accumulated in first-observed order per kind
//! - **Policy**: the per-run rules (expected/forbidden text, fail toggles,
//!   ignore patterns)
//! - **Classifier**: `classify` is a pure function from observed state and
//!   policy to a [`Verdict`]
//! - **Report**: the persisted result of one run
//! - **History**: compaction of reports into [`HistoryEntry`] values and the
//!   deduplicating, bounded merge
//!
//! Nothing in this crate performs I/O. Reading and writing the JSON files is
//! left to the binary so every rule here can be tested without a browser or
//! filesystem.
//!
//! ## Example
//!
//! ```
//! use pagewatch_core::{classify, Diagnostics, Policy};
//!
//! let policy = Policy::default();
//! let verdict = classify(404, "<html></html>", &Diagnostics::default(), &policy);
//!
//! assert!(!verdict.is_ok());
//! assert_eq!(verdict.failures(), ["HTTP status not OK: 404"]);
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod classify;
pub mod diagnostics;
pub mod error;
pub mod history;
pub mod policy;
pub mod report;
pub mod snippet;

// Re-export main types for convenience
pub use classify::{Verdict, classify};
pub use diagnostics::{
    ConsoleMessage, ConsoleSeverity, DiagnosticRecord, Diagnostics, PageError, RequestFailure,
};
pub use error::HistoryError;
pub use history::{
    Counts, DEFAULT_HISTORY_MAX, HistoryEntry, IdentityKey, MAX_FAILURES_PER_ENTRY, RunMeta,
    dedupe_and_trim, merge_history, parse_prior_history,
};
pub use policy::{IgnorePatterns, Policy};
pub use report::Report;
pub use snippet::{DEFAULT_SNIPPET_LEN, safe_snippet};
