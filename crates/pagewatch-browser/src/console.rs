//! Console message translation.
//!
//! Chrome reports every `console.*` call through `Runtime.consoleAPICalled`
//! and its own messages ("Failed to load resource", CSP violations, mixed
//! content) through `Log.entryAdded`. Only warnings and errors become
//! diagnostics; log, info and debug output is dropped here, before it
//! reaches the collector.

use chromiumoxide::cdp::browser_protocol::log::{LogEntry, LogEntryLevel, LogEntrySource};
use chromiumoxide::cdp::js_protocol::runtime::{ConsoleApiCalledType, EventConsoleApiCalled};
use pagewatch_core::{ConsoleMessage, ConsoleSeverity};
use serde_json::Value;

/// The severity level of a console call.
///
/// Maps directly to JavaScript console methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleLevel {
    /// `console.log()`
    Log,
    /// `console.info()`
    Info,
    /// `console.warn()`
    Warning,
    /// `console.error()`, `console.assert()` failures
    Error,
    /// `console.debug()`
    Debug,
    /// Catch-all for other console APIs (table, trace, dir, ...)
    Other,
}

impl ConsoleLevel {
    /// The diagnostic severity for levels that qualify for capture.
    #[must_use]
    pub fn severity(self) -> Option<ConsoleSeverity> {
        match self {
            ConsoleLevel::Error => Some(ConsoleSeverity::Error),
            ConsoleLevel::Warning => Some(ConsoleSeverity::Warning),
            _ => None,
        }
    }
}

impl From<&str> for ConsoleLevel {
    fn from(s: &str) -> Self {
        match s {
            "log" => ConsoleLevel::Log,
            "info" => ConsoleLevel::Info,
            "warning" | "warn" => ConsoleLevel::Warning,
            "error" | "assert" => ConsoleLevel::Error,
            "debug" => ConsoleLevel::Debug,
            _ => ConsoleLevel::Other,
        }
    }
}

impl From<&EventConsoleApiCalled> for ConsoleLevel {
    /// The generated CDP enum differs between chromiumoxide releases, so the
    /// variants are matched directly instead of going through a string.
    fn from(event: &EventConsoleApiCalled) -> Self {
        match event.r#type {
            ConsoleApiCalledType::Log => ConsoleLevel::Log,
            ConsoleApiCalledType::Info => ConsoleLevel::Info,
            ConsoleApiCalledType::Warning => ConsoleLevel::Warning,
            ConsoleApiCalledType::Error | ConsoleApiCalledType::Assert => ConsoleLevel::Error,
            ConsoleApiCalledType::Debug => ConsoleLevel::Debug,
            _ => ConsoleLevel::Other,
        }
    }
}

impl From<&LogEntryLevel> for ConsoleLevel {
    fn from(level: &LogEntryLevel) -> Self {
        match level {
            LogEntryLevel::Verbose => ConsoleLevel::Debug,
            LogEntryLevel::Info => ConsoleLevel::Info,
            LogEntryLevel::Warning => ConsoleLevel::Warning,
            LogEntryLevel::Error => ConsoleLevel::Error,
        }
    }
}

/// Renders one console argument the way it would read in DevTools.
///
/// Strings are used verbatim, other primitives through their JSON form,
/// and objects through the description Chrome supplies.
#[must_use]
pub fn format_console_arg(value: Option<&Value>, description: Option<&str>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => description.unwrap_or("<object>").to_string(),
        Some(other) => other.to_string(),
    }
}

/// Converts a console event into a diagnostic, or `None` for levels that
/// are not captured.
#[must_use]
pub fn console_message(event: &EventConsoleApiCalled) -> Option<ConsoleMessage> {
    let severity = ConsoleLevel::from(event).severity()?;

    let text = event
        .args
        .iter()
        .map(|arg| format_console_arg(arg.value.as_ref(), arg.description.as_deref()))
        .collect::<Vec<_>>()
        .join(" ");

    Some(ConsoleMessage::new(severity, text))
}

/// Converts a browser log entry into a diagnostic.
///
/// Worker entries duplicate what the worker's own console already reported
/// and are skipped.
#[must_use]
pub fn log_entry_message(entry: &LogEntry) -> Option<ConsoleMessage> {
    if entry.source == LogEntrySource::Worker {
        return None;
    }
    let severity = ConsoleLevel::from(&entry.level).severity()?;
    Some(ConsoleMessage::new(severity, entry.text.clone()))
}
