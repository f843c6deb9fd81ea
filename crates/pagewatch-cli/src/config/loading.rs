use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized, Toml},
};
use serde::Serialize;
use tracing::debug;

use crate::cli::{CheckArgs, HistoryArgs};
use crate::config::{CheckConfig, DEFAULT_CONFIG_FILE, HistoryConfig};
use crate::error::{ConfigError, Result};

/// Prefix of the structured environment variables, e.g.
/// `PAGEWATCH_CHECK__TARGET_URL` or `PAGEWATCH_HISTORY__MAX`.
const ENV_PREFIX: &str = "PAGEWATCH_";

/// Environment names understood by the check command, mapped to fields.
pub const LEGACY_CHECK_ENV: &[(&str, &str)] = &[
    ("MONITOR_TARGET_URL", "target_url"),
    ("MONITOR_TIMEOUT_MS", "timeout_ms"),
    ("MONITOR_NAV_TIMEOUT_MS", "nav_timeout_ms"),
    ("MONITOR_WAIT_AFTER_LOAD_MS", "wait_after_load_ms"),
    ("MONITOR_USER_AGENT", "user_agent"),
    ("MONITOR_REPORT_PATH", "report_path"),
    ("MONITOR_FAIL_ON_PAGEERROR", "fail_on_page_error"),
    ("MONITOR_FAIL_ON_CONSOLE_ERROR", "fail_on_console_error"),
    ("MONITOR_FAIL_ON_REQUEST_FAILED", "fail_on_request_failed"),
    ("MONITOR_IGNORE_ERROR_PATTERNS", "ignore_patterns"),
    ("MONITOR_EXPECT_CONTAINS", "expect_contains"),
    ("MONITOR_EXPECT_NOT_CONTAINS", "expect_not_contains"),
];

/// Environment names understood by the history command, mapped to fields.
pub const LEGACY_HISTORY_ENV: &[(&str, &str)] = &[
    ("REPORT_PATH", "report_path"),
    ("HISTORY_PATH", "history_path"),
    ("HISTORY_SOURCE_URL", "source"),
    ("HISTORY_MAX", "max"),
    ("GITHUB_RUN_ID", "run_id"),
    ("GITHUB_RUN_URL", "run_url"),
    ("GITHUB_SHA", "sha"),
];

/// An empty variable counts as unset.
fn is_set(name: &str) -> bool {
    std::env::var(name).is_ok_and(|value| !value.is_empty())
}

fn strip_prefix_ignore_case<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let head = name.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &name[prefix.len()..])
}

/// `PAGEWATCH_<SECTION>__<FIELD>` variables, nested by `__`.
fn structured_env() -> Env {
    Env::raw().filter_map(|key| {
        let name = key.as_str();
        let rest = strip_prefix_ignore_case(name, ENV_PREFIX)?;
        if rest.is_empty() || !is_set(name) {
            return None;
        }
        Some(rest.replace("__", ".").into())
    })
}

/// Flat legacy variables placed under `section`.
fn legacy_env(section: &'static str, table: &'static [(&'static str, &'static str)]) -> Env {
    Env::raw().filter_map(move |key| {
        let name = key.as_str();
        let (_, field) = table
            .iter()
            .find(|(legacy, _)| legacy.eq_ignore_ascii_case(name))?;
        if !is_set(name) {
            return None;
        }
        Some(format!("{section}.{field}").into())
    })
}

/// Resolves the config file: an explicit path must exist, the default one
/// is used only when present.
fn config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    match explicit {
        Some(path) if path.is_file() => Ok(Some(path.to_path_buf())),
        Some(path) => Err(ConfigError::NotFound(path.to_path_buf())),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            Ok(default_path.is_file().then(|| default_path.to_path_buf()))
        }
    }
}

/// Builds the layered configuration for one command section.
///
/// Layers, lowest first: `defaults`, the config file, `PAGEWATCH_*`
/// variables, then the legacy variables in `legacy`.
///
/// # Errors
///
/// Fails when an explicit config file is missing or has an unknown
/// extension.
pub fn figment<T: Serialize>(
    section: &'static str,
    defaults: T,
    explicit_file: Option<&Path>,
    legacy: &'static [(&'static str, &'static str)],
) -> Result<Figment, ConfigError> {
    let mut figment = Figment::new().merge(Serialized::default(section, defaults));

    if let Some(path) = config_file(explicit_file)? {
        debug!(path = %path.display(), "loading config file");
        figment = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => figment.merge(Toml::file(&path)),
            Some(ext) if ext.eq_ignore_ascii_case("json") => figment.merge(Json::file(&path)),
            _ => return Err(ConfigError::UnsupportedFormat(path)),
        };
    }

    Ok(figment
        .merge(structured_env())
        .merge(legacy_env(section, legacy)))
}

/// Command-line values for `check`; only flags actually given are merged.
#[derive(Debug, Default, Serialize)]
struct CheckOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    target_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expect_contains: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expect_not_contains: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ignore_patterns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nav_timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wait_after_load_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fail_on_page_error: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fail_on_console_error: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fail_on_request_failed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    headless: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chrome_path: Option<PathBuf>,
}

fn non_empty(list: &[String]) -> Option<Vec<String>> {
    (!list.is_empty()).then(|| list.to_vec())
}

impl From<&CheckArgs> for CheckOverrides {
    fn from(args: &CheckArgs) -> Self {
        Self {
            target_url: args.url.clone(),
            report_path: if args.no_report {
                Some("none".to_string())
            } else {
                args.report.clone()
            },
            expect_contains: non_empty(&args.expect_contains),
            expect_not_contains: non_empty(&args.expect_not_contains),
            ignore_patterns: non_empty(&args.ignore_patterns),
            timeout_ms: args.timeout_ms,
            nav_timeout_ms: args.nav_timeout_ms,
            wait_after_load_ms: args.wait_after_load_ms,
            user_agent: args.user_agent.clone(),
            fail_on_page_error: args.fail_on_page_error,
            fail_on_console_error: args.fail_on_console_error,
            fail_on_request_failed: args.fail_on_request_failed,
            headless: args.headed.then_some(false),
            chrome_path: args.chrome_path.clone(),
        }
    }
}

/// Command-line values for `history`.
#[derive(Debug, Default, Serialize)]
struct HistoryOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    report_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    history_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    run_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

impl From<&HistoryArgs> for HistoryOverrides {
    fn from(args: &HistoryArgs) -> Self {
        Self {
            report_path: args.report.clone(),
            history_path: args.history.clone(),
            source: args.source.clone(),
            max: args.max,
            run_id: args.run_id.clone(),
            run_url: args.run_url.clone(),
            sha: args.sha.clone(),
        }
    }
}

impl CheckConfig {
    /// Load and validate the check configuration.
    /// Priority: CLI args > environment variables > config file > defaults
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the offending field.
    pub fn load(args: &CheckArgs) -> Result<Self> {
        let config: Self = figment("check", Self::default(), args.config.as_deref(), LEGACY_CHECK_ENV)?
            .merge(Serialized::default("check", CheckOverrides::from(args)))
            .extract_inner("check")
            .map_err(ConfigError::from)?;

        config.validate()?;
        debug!(?config, "check configuration loaded");
        Ok(config)
    }
}

impl HistoryConfig {
    /// Load and validate the history configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the offending field.
    pub fn load(args: &HistoryArgs) -> Result<Self> {
        let config: Self = figment(
            "history",
            Self::default(),
            args.config.as_deref(),
            LEGACY_HISTORY_ENV,
        )?
        .merge(Serialized::default("history", HistoryOverrides::from(args)))
        .extract_inner("history")
        .map_err(ConfigError::from)?;

        config.validate()?;
        debug!(?config, "history configuration loaded");
        Ok(config)
    }
}
