//! History command implementation.

use pagewatch_core::{HistoryEntry, Report, merge_history};
use tracing::{debug, info};

use crate::cli::HistoryArgs;
use crate::commands::Outcome;
use crate::commands::utils::write_json_atomic;
use crate::config::HistoryConfig;
use crate::error::{CliError, Result};
use crate::history_source::load_prior;
use crate::ui;

/// Execute the history command.
///
/// Reads the latest report, merges its summary in front of the prior
/// history, and replaces the history file.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the report cannot be
/// read, or the history cannot be written. An unusable prior history is
/// not an error.
pub async fn execute(args: HistoryArgs) -> Result<Outcome> {
    let config = HistoryConfig::load(&args)?;

    let report = read_report(&config).await?;
    let entry = HistoryEntry::summarize(&report, config.run_meta());
    debug!(checked_at = %entry.checked_at, ok = entry.ok, "summarized report");

    let prior = load_prior(config.source(), config.source_timeout()).await;
    let merged = merge_history(entry, prior, config.max);

    write_json_atomic(&config.history_path, &merged)?;
    info!(path = %config.history_path.display(), items = merged.len(), "history written");
    ui::success(&format!(
        "Wrote history: {} (items={})",
        config.history_path.display(),
        merged.len()
    ));

    Ok(Outcome::Passed)
}

async fn read_report(config: &HistoryConfig) -> Result<Report> {
    let path = &config.report_path;
    let unreadable = |reason: String| CliError::ReportUnreadable {
        path: path.clone(),
        reason,
    };

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| unreadable(e.to_string()))?;
    Report::from_json(&bytes).map_err(|e| unreadable(e.to_string()))
}
