//! The end-of-run summary of a check.

use owo_colors::OwoColorize;
use pagewatch_core::Report;

use super::colors_enabled;

fn status_label(status: u16) -> String {
    if status == 0 {
        "no status".to_string()
    } else {
        status.to_string()
    }
}

/// The summary as plain lines: the verdict line, then one line per failure.
pub fn summary_lines(report: &Report) -> Vec<String> {
    let verdict = if report.ok { "OK" } else { "FAIL" };
    let mut lines = vec![format!(
        "{verdict}: {} ({}) in {}ms",
        report.url,
        status_label(report.status),
        report.duration_ms
    )];
    lines.extend(report.failures.iter().map(|failure| format!("- {failure}")));
    lines
}

/// Prints [`summary_lines`] to stderr.
pub fn print_report_summary(report: &Report) {
    let lines = summary_lines(report);
    let Some((head, failures)) = lines.split_first() else {
        return;
    };

    if !colors_enabled() {
        eprintln!("{head}");
        for line in failures {
            eprintln!("{line}");
        }
        return;
    }

    if report.ok {
        eprintln!("{}", head.green().bold());
    } else {
        eprintln!("{}", head.red().bold());
    }
    for line in failures {
        eprintln!("{}", line.red());
    }
}
