//! Loading prior history from a URL or a local file.
//!
//! Every failure here degrades to an empty history: a stale or broken
//! rolling log must never stop a new entry from being recorded. The cause is
//! still logged and shown so a missing store is distinguishable from a
//! genuine first run.

use std::path::Path;
use std::time::Duration;

use pagewatch_core::{HistoryEntry, parse_prior_history};
use reqwest::header::ACCEPT;
use thiserror::Error;
use tracing::{debug, warn};

use crate::ui;

/// Why a prior history source could not be used.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Malformed(#[from] pagewatch_core::HistoryError),
}

fn is_remote(source: &str) -> bool {
    let lower = source.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

async fn fetch(url: &str, timeout: Duration) -> Result<Vec<u8>, SourceError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let response = client
        .get(url)
        .header(ACCEPT, "application/json")
        .send()
        .await?
        .error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

async fn read_source(source: &str, timeout: Duration) -> Result<Vec<HistoryEntry>, SourceError> {
    let bytes = if is_remote(source) {
        fetch(source, timeout).await?
    } else {
        tokio::fs::read(Path::new(source)).await?
    };
    Ok(parse_prior_history(&bytes)?)
}

/// Loads prior history, most recent first, as stored.
///
/// Returns an empty history when no source is configured or the source is
/// unreachable or malformed.
pub async fn load_prior(source: Option<&str>, timeout: Duration) -> Vec<HistoryEntry> {
    let Some(source) = source else {
        debug!("no history source configured; starting empty");
        return Vec::new();
    };

    match read_source(source, timeout).await {
        Ok(entries) => {
            debug!(source, entries = entries.len(), "loaded prior history");
            entries
        }
        Err(err) => {
            warn!(source, error = %err, "prior history unavailable; starting empty");
            ui::warning(&format!("Prior history unavailable ({err}); starting empty"));
            Vec::new()
        }
    }
}
