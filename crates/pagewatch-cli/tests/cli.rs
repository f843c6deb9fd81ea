//! End-to-end tests of the `pagewatch` binary.
//!
//! None of these launch a browser: `check` is only exercised up to
//! configuration validation or a failed launch, and `history` needs nothing
//! but files.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const REPORT: &str = r#"{
  "ok": false,
  "url": "https://example.com/",
  "status": 200,
  "durationMs": 2150,
  "checkedAt": "2026-01-31T09:00:00.000Z",
  "failures": ["Console errors: 1"],
  "diagnostics": {
    "pageErrors": [],
    "consoleMessages": [
      {"severity": "error", "text": "boom"},
      {"severity": "warning", "text": "deprecated API"}
    ],
    "requestFailures": []
  }
}"#;

/// The binary with a clean environment rooted in `dir`.
fn pagewatch(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pagewatch"));
    cmd.current_dir(dir).env_clear().env("NO_COLOR", "1");
    cmd
}

fn read_history(path: &Path) -> Vec<Value> {
    let text = fs::read_to_string(path).unwrap();
    match serde_json::from_str(&text).unwrap() {
        Value::Array(items) => items,
        other => panic!("history is not an array: {other}"),
    }
}

#[test]
fn test_check_without_target_url_is_incomplete() {
    let temp = TempDir::new().unwrap();

    pagewatch(temp.path())
        .arg("check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("target_url"));
}

#[test]
fn test_check_with_invalid_bool_names_field() {
    let temp = TempDir::new().unwrap();

    pagewatch(temp.path())
        .args(["check", "--url", "https://example.com/"])
        .env("MONITOR_FAIL_ON_PAGEERROR", "perhaps")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("fail_on_page_error"));
}

#[test]
fn test_check_launch_failure_writes_synthetic_report() {
    let temp = TempDir::new().unwrap();

    pagewatch(temp.path())
        .args([
            "check",
            "--url",
            "https://example.com/",
            "--chrome-path",
            "/nonexistent/chrome",
            "--report",
            "out/r.json",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("FAIL: https://example.com/ (no status)"))
        .stderr(predicate::str::contains("- Request failed:"));

    let text = fs::read_to_string(temp.path().join("out/r.json")).unwrap();
    let report: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(report["ok"], false);
    assert_eq!(report["status"], 0);
    assert_eq!(report["url"], "https://example.com/");

    let failures = report["failures"].as_array().unwrap();
    assert_eq!(failures.len(), 1);
    let failure = failures[0].as_str().unwrap();
    assert!(failure.starts_with("Request failed: "), "{failure}");
    assert!(failure.contains("/nonexistent/chrome"), "{failure}");

    for key in ["pageErrors", "consoleMessages", "requestFailures"] {
        assert_eq!(report["diagnostics"][key], Value::Array(vec![]), "{key}");
    }
}

#[test]
fn test_history_from_scratch() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("public")).unwrap();
    fs::write(temp.path().join("public/monitor-report.json"), REPORT).unwrap();

    pagewatch(temp.path())
        .arg("history")
        .env("GITHUB_RUN_ID", "42")
        .env("GITHUB_SHA", "abc123")
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote history: public/history.json (items=1)"));

    let history = read_history(&temp.path().join("public/history.json"));
    assert_eq!(history.len(), 1);
    let entry = &history[0];
    assert_eq!(entry["ok"], false);
    assert_eq!(entry["checkedAt"], "2026-01-31T09:00:00.000Z");
    assert_eq!(entry["counts"]["consoleErrors"], 1);
    assert_eq!(entry["counts"]["consoleWarnings"], 1);
    assert_eq!(entry["meta"]["runId"], "42");
    assert_eq!(entry["meta"]["sha"], "abc123");
}

#[test]
fn test_history_merges_in_front_of_prior() {
    let temp = TempDir::new().unwrap();
    let report = temp.path().join("report.json");
    let prior = temp.path().join("prior.json");
    let out = temp.path().join("out/history.json");
    fs::write(&report, REPORT).unwrap();
    fs::write(
        &prior,
        r#"[{"checkedAt": "2026-01-31T08:00:00.000Z", "ok": true, "meta": {"runId": "41"}},
           {"checkedAt": "2026-01-31T07:00:00.000Z", "ok": true, "meta": {"runId": "40"}}]"#,
    )
    .unwrap();

    pagewatch(temp.path())
        .arg("history")
        .arg("--report")
        .arg(&report)
        .arg("--history")
        .arg(&out)
        .arg("--source")
        .arg(&prior)
        .args(["--run-id", "42", "--max", "2"])
        .assert()
        .success()
        .stderr(predicate::str::contains("items=2"));

    let history = read_history(&out);
    let ids: Vec<_> = history.iter().map(|e| e["meta"]["runId"].clone()).collect();
    assert_eq!(ids, ["42", "41"]);
}

#[test]
fn test_history_rerun_replaces_nothing_twice() {
    let temp = TempDir::new().unwrap();
    let report = temp.path().join("report.json");
    let history = temp.path().join("history.json");
    fs::write(&report, REPORT).unwrap();

    for _ in 0..2 {
        pagewatch(temp.path())
            .arg("history")
            .arg("--report")
            .arg(&report)
            .arg("--history")
            .arg(&history)
            .arg("--source")
            .arg(&history)
            .args(["--run-id", "7"])
            .assert()
            .success()
            .stderr(predicate::str::contains("items=1"));
    }

    assert_eq!(read_history(&history).len(), 1);
}

#[test]
fn test_history_with_malformed_source_starts_empty() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("report.json"), REPORT).unwrap();
    fs::write(temp.path().join("prior.json"), "<html>not json</html>").unwrap();

    pagewatch(temp.path())
        .args([
            "history",
            "--report",
            "report.json",
            "--history",
            "history.json",
            "--source",
            "prior.json",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Prior history unavailable"))
        .stderr(predicate::str::contains("items=1"));
}

#[test]
fn test_history_with_unreachable_source_starts_empty() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("report.json"), REPORT).unwrap();

    pagewatch(temp.path())
        .args(["history", "--report", "report.json", "--history", "history.json"])
        .env("HISTORY_SOURCE_URL", "http://127.0.0.1:9/history.json")
        .assert()
        .success()
        .stderr(predicate::str::contains("items=1"));
}

#[test]
fn test_history_without_report_fails() {
    let temp = TempDir::new().unwrap();

    pagewatch(temp.path())
        .args(["history", "--report", "missing.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("missing.json"));

    assert!(!temp.path().join("public/history.json").exists());
}

#[test]
fn test_history_rejects_zero_max() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("report.json"), REPORT).unwrap();

    pagewatch(temp.path())
        .args(["history", "--report", "report.json", "--max", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("max"));
}

#[test]
fn test_history_reads_config_file() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("latest.json"), REPORT).unwrap();
    fs::write(
        temp.path().join("pagewatch.toml"),
        "[history]\nreport_path = \"latest.json\"\nhistory_path = \"site/history.json\"\nmax = 5\n",
    )
    .unwrap();

    pagewatch(temp.path())
        .arg("history")
        .assert()
        .success()
        .stderr(predicate::str::contains("site/history.json"));

    assert_eq!(read_history(&temp.path().join("site/history.json")).len(), 1);
}
