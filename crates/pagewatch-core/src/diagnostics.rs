//! Typed diagnostic records observed while a page loads.
//!
//! Three kinds of signal are tracked: uncaught script exceptions, console
//! messages of warning or error severity, and requests that failed at the
//! transport level. Each kind is kept in its own sequence in the order it
//! was first observed; no ordering across kinds is recorded.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::policy::IgnorePatterns;

/// An uncaught exception thrown by page script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl PageError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
        }
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

/// Severity of a captured console message.
///
/// Informational and debug output is never captured, so only the two
/// qualifying levels exist here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleSeverity {
    Error,
    Warning,
}

impl ConsoleSeverity {
    #[must_use]
    pub fn is_error(self) -> bool {
        matches!(self, ConsoleSeverity::Error)
    }
}

/// A console emission of warning or error severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleMessage {
    /// Older reports wrote this field as `type`.
    #[serde(alias = "type")]
    pub severity: ConsoleSeverity,
    pub text: String,
}

impl ConsoleMessage {
    #[must_use]
    pub fn new(severity: ConsoleSeverity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(ConsoleSeverity::Error, text)
    }

    #[must_use]
    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(ConsoleSeverity::Warning, text)
    }
}

/// A request the browser could not complete (DNS, connection reset,
/// blocked, aborted). A non-2xx response is not a request failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFailure {
    pub url: String,
    pub method: String,
    pub resource_type: String,
    pub error_text: String,
}

/// One observed browser-side event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticRecord {
    PageError(PageError),
    Console(ConsoleMessage),
    RequestFailure(RequestFailure),
}

impl DiagnosticRecord {
    /// The text ignore patterns are matched against.
    ///
    /// Page errors match on their message, console messages on their text,
    /// and request failures on `"<url> <errorText>"`.
    #[must_use]
    pub fn canonical_text(&self) -> Cow<'_, str> {
        match self {
            DiagnosticRecord::PageError(err) => Cow::Borrowed(&err.message),
            DiagnosticRecord::Console(msg) => Cow::Borrowed(&msg.text),
            DiagnosticRecord::RequestFailure(req) => {
                Cow::Owned(format!("{} {}", req.url, req.error_text))
            }
        }
    }

    /// Short name of the record kind, used in log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            DiagnosticRecord::PageError(_) => "page_error",
            DiagnosticRecord::Console(_) => "console",
            DiagnosticRecord::RequestFailure(_) => "request_failure",
        }
    }
}

impl From<PageError> for DiagnosticRecord {
    fn from(err: PageError) -> Self {
        DiagnosticRecord::PageError(err)
    }
}

impl From<ConsoleMessage> for DiagnosticRecord {
    fn from(msg: ConsoleMessage) -> Self {
        DiagnosticRecord::Console(msg)
    }
}

impl From<RequestFailure> for DiagnosticRecord {
    fn from(req: RequestFailure) -> Self {
        DiagnosticRecord::RequestFailure(req)
    }
}

/// The accumulated diagnostics of one run.
///
/// All three sequences are always serialized, possibly empty, so readers
/// can rely on the keys being present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    #[serde(default)]
    pub page_errors: Vec<PageError>,
    #[serde(default)]
    pub console_messages: Vec<ConsoleMessage>,
    #[serde(default)]
    pub request_failures: Vec<RequestFailure>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to the sequence for its kind.
    pub fn record(&mut self, record: DiagnosticRecord) {
        match record {
            DiagnosticRecord::PageError(err) => self.page_errors.push(err),
            DiagnosticRecord::Console(msg) => self.console_messages.push(msg),
            DiagnosticRecord::RequestFailure(req) => self.request_failures.push(req),
        }
    }

    /// Iterates every record, kind by kind.
    pub fn records(&self) -> impl Iterator<Item = DiagnosticRecord> + '_ {
        let page = self.page_errors.iter().cloned().map(DiagnosticRecord::from);
        let console = self
            .console_messages
            .iter()
            .cloned()
            .map(DiagnosticRecord::from);
        let requests = self
            .request_failures
            .iter()
            .cloned()
            .map(DiagnosticRecord::from);
        page.chain(console).chain(requests)
    }

    /// Returns a copy with every record matching an ignore pattern removed.
    #[must_use]
    pub fn filtered(&self, patterns: &IgnorePatterns) -> Self {
        let mut out = Self::default();
        for record in self.records() {
            if !patterns.is_ignored(&record) {
                out.record(record);
            }
        }
        out
    }

    #[must_use]
    pub fn console_error_count(&self) -> usize {
        self.console_messages
            .iter()
            .filter(|m| m.severity.is_error())
            .count()
    }

    #[must_use]
    pub fn console_warning_count(&self) -> usize {
        self.console_messages
            .iter()
            .filter(|m| m.severity == ConsoleSeverity::Warning)
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.page_errors.is_empty()
            && self.console_messages.is_empty()
            && self.request_failures.is_empty()
    }
}
