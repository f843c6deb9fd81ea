//! Per-run classification policy.

use serde::{Deserialize, Serialize};

use crate::diagnostics::DiagnosticRecord;

/// Substring patterns whose matching diagnostics are dropped before
/// classification.
///
/// A record is ignored when its canonical text contains any pattern.
/// Empty patterns would match everything and are discarded on
/// construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct IgnorePatterns(Vec<String>);

impl From<Vec<String>> for IgnorePatterns {
    fn from(patterns: Vec<String>) -> Self {
        Self::new(patterns)
    }
}

impl From<IgnorePatterns> for Vec<String> {
    fn from(patterns: IgnorePatterns) -> Self {
        patterns.0
    }
}

impl IgnorePatterns {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            patterns
                .into_iter()
                .map(Into::into)
                .filter(|p| !p.is_empty())
                .collect(),
        )
    }

    /// Parses a comma-separated list, trimming each entry.
    ///
    /// ```
    /// use pagewatch_core::IgnorePatterns;
    ///
    /// let patterns = IgnorePatterns::parse_list(" gtag , ,ResizeObserver");
    /// assert_eq!(patterns.as_slice(), ["gtag", "ResizeObserver"]);
    /// ```
    #[must_use]
    pub fn parse_list(list: &str) -> Self {
        Self::new(list.split(',').map(str::trim))
    }

    #[must_use]
    pub fn is_ignored(&self, record: &DiagnosticRecord) -> bool {
        if self.0.is_empty() {
            return false;
        }
        let text = record.canonical_text();
        self.0.iter().any(|p| text.contains(p.as_str()))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Rules deciding which observations fail a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Policy {
    /// Text that must appear in the rendered markup, checked in order.
    pub expect_contains: Vec<String>,
    /// Text that must not appear in the rendered markup.
    pub expect_not_contains: Vec<String>,
    pub fail_on_page_error: bool,
    pub fail_on_console_error: bool,
    pub fail_on_request_failed: bool,
    pub ignore_patterns: IgnorePatterns,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            expect_contains: Vec::new(),
            expect_not_contains: Vec::new(),
            fail_on_page_error: true,
            fail_on_console_error: true,
            fail_on_request_failed: false,
            ignore_patterns: IgnorePatterns::default(),
        }
    }
}
