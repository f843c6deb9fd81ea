//! Configuration for the pagewatch commands with multi-source loading.
//!
//! Priority: CLI > legacy environment > `PAGEWATCH_*` environment > file >
//! defaults. Each command reads its own section (`[check]`, `[history]`)
//! and validates it once before any work starts.

mod defaults;
mod loading;
mod serde_helpers;
mod validation;

use std::path::PathBuf;
use std::time::Duration;

use pagewatch_browser::{BrowserSettings, CollectorSettings, DEFAULT_REQUEST_TIMEOUT};
use pagewatch_core::{IgnorePatterns, Policy, RunMeta};
use serde::{Deserialize, Serialize};

pub use defaults::*;
pub use loading::{LEGACY_CHECK_ENV, LEGACY_HISTORY_ENV, figment};
pub use serde_helpers::{comma_list, lenient_bool, parse_bool, split_list, string_like};

/// Settings for `pagewatch check`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Page to check (required)
    #[serde(default, deserialize_with = "string_like")]
    pub target_url: String,

    /// Network idle wait timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_nav_timeout_ms")]
    pub nav_timeout_ms: u64,

    /// Fixed wait after load
    #[serde(default = "default_wait_after_load_ms")]
    pub wait_after_load_ms: u64,

    #[serde(default = "default_user_agent", deserialize_with = "string_like")]
    pub user_agent: String,

    /// Report destination; `none` or `0` disables writing
    #[serde(default = "default_report_path", deserialize_with = "string_like")]
    pub report_path: String,

    #[serde(default = "default_true", deserialize_with = "lenient_bool")]
    pub fail_on_page_error: bool,

    #[serde(default = "default_true", deserialize_with = "lenient_bool")]
    pub fail_on_console_error: bool,

    #[serde(default, deserialize_with = "lenient_bool")]
    pub fail_on_request_failed: bool,

    #[serde(default, deserialize_with = "comma_list")]
    pub ignore_patterns: Vec<String>,

    #[serde(default, deserialize_with = "comma_list")]
    pub expect_contains: Vec<String>,

    #[serde(default, deserialize_with = "comma_list")]
    pub expect_not_contains: Vec<String>,

    #[serde(default = "default_true", deserialize_with = "lenient_bool")]
    pub headless: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            target_url: String::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            nav_timeout_ms: DEFAULT_NAV_TIMEOUT_MS,
            wait_after_load_ms: DEFAULT_WAIT_AFTER_LOAD_MS,
            user_agent: default_user_agent(),
            report_path: default_report_path(),
            fail_on_page_error: true,
            fail_on_console_error: true,
            fail_on_request_failed: false,
            ignore_patterns: Vec::new(),
            expect_contains: Vec::new(),
            expect_not_contains: Vec::new(),
            headless: !cfg!(feature = "visible"),
            chrome_path: None,
        }
    }
}

impl CheckConfig {
    /// The classification rules for this run.
    #[must_use]
    pub fn policy(&self) -> Policy {
        Policy {
            expect_contains: self.expect_contains.clone(),
            expect_not_contains: self.expect_not_contains.clone(),
            fail_on_page_error: self.fail_on_page_error,
            fail_on_console_error: self.fail_on_console_error,
            fail_on_request_failed: self.fail_on_request_failed,
            ignore_patterns: self.ignore_patterns(),
        }
    }

    #[must_use]
    pub fn ignore_patterns(&self) -> IgnorePatterns {
        IgnorePatterns::new(self.ignore_patterns.iter().cloned())
    }

    /// Where the report goes, or `None` when writing is disabled.
    #[must_use]
    pub fn report_destination(&self) -> Option<PathBuf> {
        let path = self.report_path.trim();
        if path.is_empty() || path == "0" || path.eq_ignore_ascii_case("none") {
            None
        } else {
            Some(PathBuf::from(path))
        }
    }

    #[must_use]
    pub fn collector_settings(&self) -> CollectorSettings {
        CollectorSettings {
            navigation_timeout: Duration::from_millis(self.nav_timeout_ms),
            idle_timeout: Duration::from_millis(self.timeout_ms),
            settle_delay: Duration::from_millis(self.wait_after_load_ms),
            ..CollectorSettings::default()
        }
    }

    /// Deadline for individual CDP commands: the longer of the two waits
    /// plus slack, so the collector's own timeouts always fire first.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        let longest = self.nav_timeout_ms.max(self.timeout_ms);
        Duration::from_millis(longest.saturating_add(REQUEST_TIMEOUT_SLACK_MS))
            .max(DEFAULT_REQUEST_TIMEOUT)
    }

    #[must_use]
    pub fn browser_settings(&self) -> BrowserSettings {
        let mut settings = BrowserSettings::new()
            .with_user_agent(self.user_agent.clone())
            .with_request_timeout(self.request_timeout());
        settings.headless = self.headless;
        if let Some(path) = &self.chrome_path {
            settings = settings.with_chrome_path(path.clone());
        }
        settings
    }
}

/// Settings for `pagewatch history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Report to summarize
    #[serde(default = "default_report_path_buf")]
    pub report_path: PathBuf,

    /// Destination of the merged history
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,

    /// Prior history: http(s) URL or local path; empty for none
    #[serde(default, deserialize_with = "string_like")]
    pub source: String,

    #[serde(default = "default_source_timeout_ms")]
    pub source_timeout_ms: u64,

    /// Maximum number of retained entries
    #[serde(default = "default_history_max")]
    pub max: usize,

    #[serde(default, deserialize_with = "string_like")]
    pub run_id: String,

    #[serde(default, deserialize_with = "string_like")]
    pub run_url: String,

    #[serde(default, deserialize_with = "string_like")]
    pub sha: String,
}

fn default_report_path_buf() -> PathBuf {
    PathBuf::from(DEFAULT_REPORT_PATH)
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            report_path: default_report_path_buf(),
            history_path: default_history_path(),
            source: String::new(),
            source_timeout_ms: DEFAULT_SOURCE_TIMEOUT_MS,
            max: DEFAULT_HISTORY_MAX,
            run_id: String::new(),
            run_url: String::new(),
            sha: String::new(),
        }
    }
}

impl HistoryConfig {
    /// The prior history location, if one is configured.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        Some(self.source.trim()).filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn run_meta(&self) -> RunMeta {
        RunMeta::new(&self.run_id, &self.run_url, &self.sha)
    }

    #[must_use]
    pub fn source_timeout(&self) -> Duration {
        Duration::from_millis(self.source_timeout_ms)
    }
}
