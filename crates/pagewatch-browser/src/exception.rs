//! Uncaught exception translation.

use chromiumoxide::cdp::js_protocol::runtime::EventExceptionThrown;
use pagewatch_core::PageError;
use serde_json::Value;

/// Builds a page error from the parts of `Runtime.exceptionThrown`.
///
/// For thrown `Error` objects Chrome's description is the stack
/// (`"TypeError: boom\n    at f (app.js:1:7)"`); the message is its first
/// line without the `<ClassName>: ` prefix and the full description is kept
/// as the stack. Thrown primitives use their value. `text` (usually
/// `"Uncaught"`) is the last resort.
#[must_use]
pub fn page_error_from_parts(
    text: &str,
    class_name: Option<&str>,
    description: Option<&str>,
    value: Option<&Value>,
) -> PageError {
    if let Some(description) = description.filter(|d| !d.is_empty()) {
        let first_line = description.lines().next().unwrap_or(description);
        let message = class_name
            .and_then(|class| first_line.strip_prefix(class))
            .and_then(|rest| rest.strip_prefix(": "))
            .unwrap_or(first_line);

        let error = PageError::new(message);
        return if description.contains('\n') {
            error.with_stack(description)
        } else {
            error
        };
    }

    match value {
        Some(Value::String(s)) => PageError::new(s.clone()),
        Some(Value::Null) | None => PageError::new(text),
        Some(other) => PageError::new(other.to_string()),
    }
}

/// Converts a `Runtime.exceptionThrown` event into a page error.
#[must_use]
pub fn page_error(event: &EventExceptionThrown) -> PageError {
    let details = &event.exception_details;
    let exception = details.exception.as_ref();
    page_error_from_parts(
        &details.text,
        exception.and_then(|e| e.class_name.as_deref()),
        exception.and_then(|e| e.description.as_deref()),
        exception.and_then(|e| e.value.as_ref()),
    )
}
