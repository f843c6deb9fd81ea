//! The persisted verdict of one run.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::classify::Verdict;
use crate::diagnostics::Diagnostics;

/// Result of a single check, written once by the check and read once by
/// the history merge.
///
/// `ok` always equals `failures.is_empty()`; both constructors enforce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub ok: bool,
    pub url: String,
    /// Main document response status, 0 when navigation produced none.
    pub status: u16,
    pub duration_ms: u64,
    #[serde(with = "iso_millis")]
    pub checked_at: DateTime<Utc>,
    pub failures: Vec<String>,
    #[serde(default)]
    pub diagnostics: Diagnostics,
}

impl Report {
    /// Assembles a report from a completed classification.
    #[must_use]
    pub fn from_verdict(
        url: impl Into<String>,
        status: u16,
        duration_ms: u64,
        checked_at: DateTime<Utc>,
        verdict: Verdict,
        diagnostics: Diagnostics,
    ) -> Self {
        let failures = verdict.into_failures();
        Self {
            ok: failures.is_empty(),
            url: url.into(),
            status,
            duration_ms,
            checked_at,
            failures,
            diagnostics,
        }
    }

    /// A report for a run that never produced a page to classify
    /// (launch failure, DNS failure, navigation timeout).
    #[must_use]
    pub fn transport_failure(
        url: impl Into<String>,
        reason: impl std::fmt::Display,
        duration_ms: u64,
        checked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            ok: false,
            url: url.into(),
            status: 0,
            duration_ms,
            checked_at,
            failures: vec![format!("Request failed: {reason}")],
            diagnostics: Diagnostics::default(),
        }
    }

    /// `checkedAt` exactly as it is written to JSON.
    #[must_use]
    pub fn checked_at_string(&self) -> String {
        iso_millis::format(&self.checked_at)
    }

    /// Serializes with two-space indentation.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parses a report previously written by [`Report::to_json_pretty`].
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid report.
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// RFC 3339 timestamps in UTC with millisecond precision and a `Z`
/// suffix, e.g. `2026-01-31T09:00:00.000Z`.
mod iso_millis {
    use super::*;

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::diagnostics::PageError;
    use crate::policy::Policy;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn ok_tracks_failures() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.record(PageError::new("boom").into());
        let verdict = classify(200, "", &diagnostics, &Policy::default());

        let report = Report::from_verdict(
            "https://example.com",
            200,
            812,
            fixed_time(),
            verdict,
            diagnostics,
        );
        assert!(!report.ok);
        assert_eq!(report.failures, ["JS page errors: 1"]);
        assert_eq!(report.diagnostics.page_errors.len(), 1);
    }

    #[test]
    fn transport_failure_is_degenerate() {
        let report = Report::transport_failure(
            "https://unreachable.invalid",
            "net::ERR_NAME_NOT_RESOLVED",
            31,
            fixed_time(),
        );
        assert!(!report.ok);
        assert_eq!(report.status, 0);
        assert_eq!(report.failures, ["Request failed: net::ERR_NAME_NOT_RESOLVED"]);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn json_shape_uses_camel_case_and_millis() {
        let report = Report::from_verdict(
            "https://example.com",
            200,
            1500,
            fixed_time(),
            Verdict::default(),
            Diagnostics::default(),
        );
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["ok"], true);
        assert_eq!(json["durationMs"], 1500);
        assert_eq!(json["checkedAt"], "2026-03-01T09:30:00.000Z");
        assert_eq!(json["diagnostics"]["pageErrors"], serde_json::json!([]));
        assert_eq!(json["diagnostics"]["consoleMessages"], serde_json::json!([]));
        assert_eq!(json["diagnostics"]["requestFailures"], serde_json::json!([]));
    }

    #[test]
    fn reads_back_what_it_writes() {
        let report = Report::transport_failure("https://example.com", "timeout", 30_000, fixed_time());
        let json = report.to_json_pretty().unwrap();
        let parsed = Report::from_json(json.as_bytes()).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn accepts_timestamps_with_offsets() {
        let json = r#"{
            "ok": true, "url": "u", "status": 200, "durationMs": 5,
            "checkedAt": "2026-03-01T18:30:00+09:00", "failures": []
        }"#;
        let report = Report::from_json(json.as_bytes()).unwrap();
        assert_eq!(report.checked_at, fixed_time());
        assert!(report.diagnostics.is_empty());
    }
}
