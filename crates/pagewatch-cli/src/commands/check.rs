//! Check command implementation.
//!
//! One run: launch a fresh browser, observe the target, classify what was
//! seen, and write the report. Transport failures still produce a report so
//! downstream history stays continuous.

use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use pagewatch_browser::{BrowserError, HeadlessBrowser, Observation, SignalCollector, observe};
use pagewatch_core::{Report, classify};
use tracing::{debug, info, warn};

use crate::cli::CheckArgs;
use crate::commands::Outcome;
use crate::commands::utils::{elapsed_ms, write_json_atomic};
use crate::config::CheckConfig;
use crate::error::Result;
use crate::ui;

/// Execute the check command.
///
/// # Errors
///
/// Returns an error when the configuration is invalid or the report cannot
/// be written. A page that fails its checks is reported through the
/// [`Outcome`], not as an error.
pub async fn execute(args: CheckArgs) -> Result<Outcome> {
    let config = CheckConfig::load(&args)?;
    let url = config.target_url.trim().to_string();

    info!(url = %url, "checking page");
    let checked_at = Utc::now();
    let start = Instant::now();

    let observed = observe_target(&config, &url).await;
    let duration_ms = elapsed_ms(start);

    let (report, outcome) = match observed {
        Ok(observation) => {
            let verdict = classify(
                observation.status,
                &observation.markup,
                &observation.diagnostics,
                &config.policy(),
            );
            let outcome = if verdict.is_ok() {
                Outcome::Passed
            } else {
                Outcome::Failed
            };
            let report = Report::from_verdict(
                url,
                observation.status,
                duration_ms,
                checked_at,
                verdict,
                observation.diagnostics,
            );
            (report, outcome)
        }
        Err(err) => {
            warn!(error = %err, "page could not be observed");
            (
                Report::transport_failure(url, &err, duration_ms, checked_at),
                Outcome::Incomplete,
            )
        }
    };

    // printed before writing so a persistence error still leaves the listing
    ui::print_report_summary(&report);

    if let Some(path) = config.report_destination() {
        write_report(&path, &report)?;
    } else {
        debug!("report writing disabled");
    }

    Ok(outcome)
}

/// Launches a browser, observes `url`, and closes the browser on every path.
async fn observe_target(
    config: &CheckConfig,
    url: &str,
) -> std::result::Result<Observation, BrowserError> {
    let browser = HeadlessBrowser::launch(config.browser_settings()).await?;
    let collector = SignalCollector::new(config.collector_settings(), config.ignore_patterns());

    let observed = observe(&browser, &collector, url).await;

    if let Err(e) = browser.close().await {
        warn!("failed to close browser: {e}");
    }
    observed
}

fn write_report(path: &Path, report: &Report) -> Result<()> {
    write_json_atomic(path, report)?;
    ui::info(&format!("Wrote report: {}", path.display()));
    Ok(())
}
