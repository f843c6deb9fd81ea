use std::path::PathBuf;

pub use pagewatch_browser::DEFAULT_USER_AGENT;
pub use pagewatch_core::DEFAULT_HISTORY_MAX;

/// Config file picked up from the working directory when --config is absent.
pub const DEFAULT_CONFIG_FILE: &str = "pagewatch.toml";

pub const DEFAULT_TIMEOUT_MS: u64 = 45_000;
pub const DEFAULT_NAV_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_WAIT_AFTER_LOAD_MS: u64 = 1_500;

/// Added on top of the longest wait when bounding CDP commands.
pub const REQUEST_TIMEOUT_SLACK_MS: u64 = 5_000;

pub const DEFAULT_REPORT_PATH: &str = "public/monitor-report.json";
pub const DEFAULT_HISTORY_PATH: &str = "public/history.json";

/// Timeout for fetching prior history over HTTP.
pub const DEFAULT_SOURCE_TIMEOUT_MS: u64 = 15_000;

pub fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

pub fn default_nav_timeout_ms() -> u64 {
    DEFAULT_NAV_TIMEOUT_MS
}

pub fn default_wait_after_load_ms() -> u64 {
    DEFAULT_WAIT_AFTER_LOAD_MS
}

pub fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

pub fn default_report_path() -> String {
    DEFAULT_REPORT_PATH.to_string()
}

pub fn default_history_path() -> PathBuf {
    PathBuf::from(DEFAULT_HISTORY_PATH)
}

pub fn default_history_max() -> usize {
    DEFAULT_HISTORY_MAX
}

pub fn default_source_timeout_ms() -> u64 {
    DEFAULT_SOURCE_TIMEOUT_MS
}

pub fn default_true() -> bool {
    true
}
