//! Failure classification.
//!
//! [`classify`] reduces everything observed during one run to an ordered
//! list of failure lines. The evaluation order is fixed and each step
//! contributes at most one line:
//!
//! 1. HTTP status outside `[200, 300)` (a status of 0 is skipped)
//! 2. Each expected text missing from the markup, in policy order
//! 3. Each forbidden text present in the markup, in policy order
//! 4. Page errors, when the policy fails on them
//! 5. Console errors, when the policy fails on them (warnings never fail)
//! 6. Request failures, when the policy fails on them
//!
//! Steps 4–6 report a count only. The records themselves stay in the
//! report's diagnostics.

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::policy::Policy;
use crate::snippet::{DEFAULT_SNIPPET_LEN, safe_snippet};

/// The outcome of classifying one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Verdict {
    failures: Vec<String>,
}

impl Verdict {
    /// A run passes exactly when nothing failed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    #[must_use]
    pub fn into_failures(self) -> Vec<String> {
        self.failures
    }
}

/// Classifies one run's observations under `policy`.
///
/// Pure and total: identical inputs always produce identical output.
/// Diagnostics are expected to be filtered already; the policy's ignore
/// patterns are not re-applied here.
#[must_use]
pub fn classify(status: u16, markup: &str, diagnostics: &Diagnostics, policy: &Policy) -> Verdict {
    let mut failures = Vec::new();

    if status != 0 && !(200..300).contains(&status) {
        failures.push(format!("HTTP status not OK: {status}"));
    }

    for needle in &policy.expect_contains {
        if !markup.contains(needle.as_str()) {
            failures.push(format!(
                "Missing expected text: {}",
                safe_snippet(needle, DEFAULT_SNIPPET_LEN)
            ));
        }
    }

    for needle in &policy.expect_not_contains {
        if markup.contains(needle.as_str()) {
            failures.push(format!(
                "Found disallowed text: {}",
                safe_snippet(needle, DEFAULT_SNIPPET_LEN)
            ));
        }
    }

    if policy.fail_on_page_error && !diagnostics.page_errors.is_empty() {
        failures.push(format!("JS page errors: {}", diagnostics.page_errors.len()));
    }

    let console_errors = diagnostics.console_error_count();
    if policy.fail_on_console_error && console_errors > 0 {
        failures.push(format!("Console errors: {console_errors}"));
    }

    if policy.fail_on_request_failed && !diagnostics.request_failures.is_empty() {
        failures.push(format!(
            "Request failures: {}",
            diagnostics.request_failures.len()
        ));
    }

    Verdict { failures }
}
