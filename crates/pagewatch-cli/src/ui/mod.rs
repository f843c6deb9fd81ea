//! Terminal output for status lines and run summaries.
//!
//! Everything here writes to stderr. Colors are decided once by
//! [`init_colors`] and degrade to plain text when stderr is not a terminal,
//! `NO_COLOR` is set, or `--no-color` was passed.
//!
//! ```no_run
//! use pagewatch_cli::ui;
//!
//! ui::init_colors(false);
//! ui::success("Wrote history: public/history.json (items=3)");
//! ui::warning("Prior history unavailable; starting empty");
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

mod format;
mod messages;

pub use format::{print_report_summary, summary_lines};
pub use messages::{error, info, success, warning};

static COLORS: AtomicBool = AtomicBool::new(false);

/// Check if color output should be enabled.
///
/// `NO_COLOR` disables colors, `FORCE_COLOR` forces them, otherwise they
/// follow whether a user is attached to stderr.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

/// Decides once whether status lines are colored.
pub fn init_colors(no_color: bool) {
    COLORS.store(!no_color && should_use_color(), Ordering::Relaxed);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_color_flag_disables_colors() {
        init_colors(true);
        assert!(!colors_enabled());
    }
}
