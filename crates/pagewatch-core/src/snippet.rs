//! Bounded single-line rendering of arbitrary text for failure lines.

/// Default character cap for snippets embedded in failure lines.
pub const DEFAULT_SNIPPET_LEN: usize = 120;

/// Collapses whitespace runs to single spaces and caps the result at
/// `max_chars` characters, ending truncated text with `…`.
///
/// ```
/// use pagewatch_core::safe_snippet;
///
/// assert_eq!(safe_snippet("  <div\n  id=\"slot\">  ", 120), "<div id=\"slot\">");
/// assert_eq!(safe_snippet("abcdef", 4), "abc…");
/// ```
#[must_use]
pub fn safe_snippet(text: &str, max_chars: usize) -> String {
    let one_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if one_line.chars().count() <= max_chars {
        return one_line;
    }
    let mut out: String = one_line.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
