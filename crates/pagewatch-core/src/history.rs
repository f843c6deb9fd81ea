//! Rolling history of compacted reports.
//!
//! Each merge places the newest entry first, followed by the prior entries
//! in the order they were given, drops later duplicates of an identity key,
//! and keeps at most `max` entries. Merging the same run twice (for example
//! a retried publish step) therefore leaves a single entry for it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{HistoryError, Result};
use crate::report::Report;

/// Default retained length: roughly one month of hourly runs.
pub const DEFAULT_HISTORY_MAX: usize = 720;

/// Failure lines kept per entry; the tallies in [`Counts`] still cover the
/// full diagnostics.
pub const MAX_FAILURES_PER_ENTRY: usize = 50;

/// Tallies over a report's untruncated diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Counts {
    pub page_errors: usize,
    pub console_errors: usize,
    pub console_warnings: usize,
    pub request_failures: usize,
}

/// Identifies the execution that produced a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

impl RunMeta {
    /// Builds metadata, treating empty strings as absent.
    pub fn new(
        run_id: impl Into<String>,
        run_url: impl Into<String>,
        sha: impl Into<String>,
    ) -> Self {
        fn non_empty(value: String) -> Option<String> {
            (!value.is_empty()).then_some(value)
        }
        Self {
            run_id: non_empty(run_id.into()),
            run_url: non_empty(run_url.into()),
            sha: non_empty(sha.into()),
        }
    }
}

/// The compacted, retained summary of one past run.
///
/// Every field has a default so entries written by other tools, or by
/// older versions, still load. Top-level keys this type does not know are
/// kept in `extra` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryEntry {
    pub checked_at: String,
    pub ok: bool,
    pub url: String,
    pub status: u16,
    pub duration_ms: u64,
    pub failures: Vec<String>,
    pub counts: Counts,
    pub meta: RunMeta,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HistoryEntry {
    /// Projects a report into a history entry.
    #[must_use]
    pub fn summarize(report: &Report, meta: RunMeta) -> Self {
        let diagnostics = &report.diagnostics;
        Self {
            checked_at: report.checked_at_string(),
            ok: report.ok,
            url: report.url.clone(),
            status: report.status,
            duration_ms: report.duration_ms,
            failures: report
                .failures
                .iter()
                .take(MAX_FAILURES_PER_ENTRY)
                .cloned()
                .collect(),
            counts: Counts {
                page_errors: diagnostics.page_errors.len(),
                console_errors: diagnostics.console_error_count(),
                console_warnings: diagnostics.console_warning_count(),
                request_failures: diagnostics.request_failures.len(),
            },
            meta,
            extra: Map::new(),
        }
    }

    /// The key used to detect duplicates.
    ///
    /// Precedence: a non-empty run id, then a non-empty `checkedAt`, then a
    /// fingerprint of the whole entry.
    #[must_use]
    pub fn identity_key(&self) -> IdentityKey {
        if let Some(run_id) = self.meta.run_id.as_deref().filter(|id| !id.is_empty()) {
            return IdentityKey::RunId(run_id.to_string());
        }
        if !self.checked_at.is_empty() {
            return IdentityKey::CheckedAt(self.checked_at.clone());
        }
        IdentityKey::Fingerprint(format!("{self:?}"))
    }
}

/// Duplicate-detection key of a [`HistoryEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    RunId(String),
    CheckedAt(String),
    Fingerprint(String),
}

/// Keeps the first occurrence of every identity key, up to `max` entries.
#[must_use]
pub fn dedupe_and_trim<I>(items: I, max: usize) -> Vec<HistoryEntry>
where
    I: IntoIterator<Item = HistoryEntry>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if out.len() >= max {
            break;
        }
        let key = item.identity_key();
        if !seen.insert(key) {
            debug!(checked_at = %item.checked_at, "dropping duplicate history entry");
            continue;
        }
        out.push(item);
    }
    out
}

/// Merges a new entry in front of the prior history.
///
/// The prior sequence is assumed to be most-recent-first already; it is
/// not re-sorted.
#[must_use]
pub fn merge_history(entry: HistoryEntry, prior: Vec<HistoryEntry>, max: usize) -> Vec<HistoryEntry> {
    let prior_len = prior.len();
    let merged = dedupe_and_trim(std::iter::once(entry).chain(prior), max);
    debug!(prior = prior_len, merged = merged.len(), max, "merged history");
    merged
}

/// Parses a prior history document.
///
/// The top-level value must be an array. Elements that cannot be read as
/// a history entry are skipped with a warning rather than failing the
/// whole source.
///
/// # Errors
///
/// Returns [`HistoryError`] when the bytes are not JSON or not an array.
pub fn parse_prior_history(bytes: &[u8]) -> Result<Vec<HistoryEntry>> {
    let value: Value = serde_json::from_slice(bytes)?;
    let Value::Array(items) = value else {
        return Err(HistoryError::NotAnArray {
            found: json_type_name(&value),
        });
    };

    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<HistoryEntry>(item) {
            Ok(entry) => entries.push(entry),
            Err(err) => warn!(index, error = %err, "skipping unreadable history entry"),
        }
    }
    Ok(entries)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Verdict;
    use crate::diagnostics::{ConsoleMessage, Diagnostics, PageError};
    use chrono::{TimeZone, Utc};

    fn entry(run_id: &str, checked_at: &str) -> HistoryEntry {
        HistoryEntry {
            checked_at: checked_at.to_string(),
            ok: true,
            url: "https://example.com".to_string(),
            status: 200,
            duration_ms: 900,
            meta: RunMeta::new(run_id, "", ""),
            ..HistoryEntry::default()
        }
    }

    fn report_with(diagnostics: Diagnostics, failures: usize) -> Report {
        let mut report = Report::from_verdict(
            "https://example.com",
            200,
            1200,
            Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0).unwrap(),
            Verdict::default(),
            diagnostics,
        );
        report.failures = (0..failures).map(|i| format!("failure {i}")).collect();
        report.ok = report.failures.is_empty();
        report
    }

    #[test]
    fn summarize_tallies_full_diagnostics_and_truncates_failures() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.record(PageError::new("p").into());
        diagnostics.record(ConsoleMessage::warning("w").into());
        diagnostics.record(ConsoleMessage::error("e").into());

        let report = report_with(diagnostics, 75);
        let summary = HistoryEntry::summarize(&report, RunMeta::new("r9", "https://ci/r9", "abc"));

        assert_eq!(summary.failures.len(), MAX_FAILURES_PER_ENTRY);
        assert_eq!(summary.failures[0], "failure 0");
        assert_eq!(summary.failures[49], "failure 49");
        assert_eq!(
            summary.counts,
            Counts {
                page_errors: 1,
                console_errors: 1,
                console_warnings: 1,
                request_failures: 0,
            }
        );
        assert_eq!(summary.checked_at, "2026-05-04T12:00:00.000Z");
        assert!(!summary.ok);
    }

    #[test]
    fn warning_only_run_counts_the_warning() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.record(ConsoleMessage::warning("deprecated").into());
        let summary = HistoryEntry::summarize(&report_with(diagnostics, 0), RunMeta::default());
        assert_eq!(summary.counts.console_warnings, 1);
        assert_eq!(summary.counts.console_errors, 0);
        assert!(summary.ok);
    }

    #[test]
    fn identity_key_precedence() {
        assert_eq!(
            entry("r1", "2026-01-01T00:00:00.000Z").identity_key(),
            IdentityKey::RunId("r1".to_string())
        );
        assert_eq!(
            entry("", "2026-01-01T00:00:00.000Z").identity_key(),
            IdentityKey::CheckedAt("2026-01-01T00:00:00.000Z".to_string())
        );
        assert!(matches!(
            entry("", "").identity_key(),
            IdentityKey::Fingerprint(_)
        ));
    }

    #[test]
    fn same_run_id_replaces_stale_entry() {
        let prior = vec![
            entry("r1", "2026-01-01T00:00:00.000Z"),
            entry("r0", "2025-12-31T23:00:00.000Z"),
        ];
        let mut fresh = entry("r1", "2026-01-01T00:05:00.000Z");
        fresh.ok = false;

        let merged = merge_history(fresh.clone(), prior, DEFAULT_HISTORY_MAX);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], fresh);
        assert_eq!(merged[1].meta.run_id.as_deref(), Some("r0"));
    }

    #[test]
    fn empty_prior_yields_only_new_entry() {
        let fresh = entry("r1", "2026-01-01T00:00:00.000Z");
        assert_eq!(merge_history(fresh.clone(), Vec::new(), 720), vec![fresh]);
    }

    #[test]
    fn merge_truncates_to_max() {
        let prior: Vec<_> = (0..10)
            .map(|i| entry(&format!("r{i}"), &format!("t{i}")))
            .collect();
        let merged = merge_history(entry("new", "tn"), prior, 3);
        let ids: Vec<_> = merged
            .iter()
            .map(|e| e.meta.run_id.clone().unwrap_or_default())
            .collect();
        assert_eq!(ids, ["new", "r0", "r1"]);
    }

    #[test]
    fn entries_without_ids_dedupe_structurally() {
        let anon = entry("", "");
        let merged = dedupe_and_trim(vec![anon.clone(), anon.clone(), anon], 10);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn run_meta_drops_empty_strings_from_json() {
        let json = serde_json::to_value(RunMeta::new("", "", "deadbeef")).unwrap();
        assert_eq!(json, serde_json::json!({ "sha": "deadbeef" }));
    }

    #[test]
    fn parse_prior_rejects_non_arrays() {
        let err = parse_prior_history(br#"{"items": []}"#).unwrap_err();
        assert!(matches!(err, HistoryError::NotAnArray { found: "object" }));

        let err = parse_prior_history(b"<!doctype html>").unwrap_err();
        assert!(matches!(err, HistoryError::Json(_)));
    }

    #[test]
    fn parse_prior_skips_unreadable_elements() {
        let raw = br#"[
            { "checkedAt": "2026-01-01T00:00:00.000Z", "ok": true, "status": 200,
              "meta": { "runId": "r1", "runUrl": "", "sha": "" } },
            "garbage",
            { "checkedAt": "2026-01-01T01:00:00.000Z", "ok": false }
        ]"#;
        let entries = parse_prior_history(raw).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].meta.run_id.as_deref(), Some("r1"));
        assert_eq!(entries[1].status, 0);
    }

    #[test]
    fn legacy_empty_run_id_falls_back_to_checked_at() {
        let raw = br#"[{ "checkedAt": "2026-01-01T00:00:00.000Z", "meta": { "runId": "" } }]"#;
        let entries = parse_prior_history(raw).unwrap();
        assert_eq!(
            entries[0].identity_key(),
            IdentityKey::CheckedAt("2026-01-01T00:00:00.000Z".to_string())
        );
    }

    #[test]
    fn unknown_fields_survive_a_merge() {
        let raw = br#"[{
            "checkedAt": "2026-01-01T00:00:00.000Z",
            "ok": true,
            "meta": { "runId": "r1" },
            "region": "eu-west-1",
            "screenshot": { "path": "shots/r1.png", "bytes": 48213 }
        }]"#;
        let prior = parse_prior_history(raw).unwrap();
        assert_eq!(prior[0].extra["region"], "eu-west-1");

        let merged = merge_history(entry("r2", "2026-01-01T01:00:00.000Z"), prior, 10);
        let json = serde_json::to_value(&merged).unwrap();

        assert_eq!(json[0].get("region"), None);
        assert_eq!(json[1]["region"], "eu-west-1");
        assert_eq!(json[1]["screenshot"]["bytes"], 48213);
        assert_eq!(json[1]["meta"]["runId"], "r1");
        assert_eq!(json[1]["checkedAt"], "2026-01-01T00:00:00.000Z");
    }
}
