use clap::{ArgAction, Args, Subcommand};
use std::path::PathBuf;

/// Available pagewatch subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check the target page once and write a report
    ///
    /// Exits 0 when the page passes, 1 when it ran but failed a check,
    /// and 2 when the run could not complete.
    Check(CheckArgs),

    /// Merge the latest report into the rolling history
    ///
    /// Prior history is fetched from --source when given; an unreachable
    /// or malformed source counts as empty history.
    History(HistoryArgs),
}

/// Arguments for the check command
///
/// Every option also has a config file key and environment variable; flags
/// take precedence over both.
#[derive(Args, Debug, Default, Clone)]
pub struct CheckArgs {
    /// Config file (TOML or JSON; default: ./pagewatch.toml if present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Page to check
    #[arg(short, long, value_name = "URL")]
    pub url: Option<String>,

    /// Where to write the report ("none" disables writing)
    #[arg(long, value_name = "PATH", conflicts_with = "no_report")]
    pub report: Option<String>,

    /// Do not write a report file
    #[arg(long)]
    pub no_report: bool,

    /// Text the rendered page must contain (repeatable)
    #[arg(long = "expect", value_name = "TEXT")]
    pub expect_contains: Vec<String>,

    /// Text the rendered page must not contain (repeatable)
    #[arg(long = "forbid", value_name = "TEXT")]
    pub expect_not_contains: Vec<String>,

    /// Drop diagnostics containing this text (repeatable)
    #[arg(long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Timeout for the network idle wait, in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Navigation timeout, in milliseconds
    #[arg(long, value_name = "MS")]
    pub nav_timeout_ms: Option<u64>,

    /// Fixed wait after load for late scripts, in milliseconds
    #[arg(long = "settle-ms", value_name = "MS")]
    pub wait_after_load_ms: Option<u64>,

    /// User agent to present
    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,

    /// Fail the check on uncaught page errors
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub fail_on_page_error: Option<bool>,

    /// Fail the check on console errors
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub fail_on_console_error: Option<bool>,

    /// Fail the check on failed network requests
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub fail_on_request_failed: Option<bool>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Chrome/Chromium executable (default: auto-detect)
    #[arg(long, value_name = "PATH")]
    pub chrome_path: Option<PathBuf>,
}

/// Arguments for the history command
#[derive(Args, Debug, Default, Clone)]
pub struct HistoryArgs {
    /// Config file (TOML or JSON; default: ./pagewatch.toml if present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report produced by `pagewatch check`
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Where to write the merged history
    #[arg(long, value_name = "PATH")]
    pub history: Option<PathBuf>,

    /// Prior history: an http(s) URL or a local path
    #[arg(long, value_name = "URL|PATH")]
    pub source: Option<String>,

    /// Maximum number of entries to keep
    #[arg(long, value_name = "N")]
    pub max: Option<usize>,

    /// Identifier of the producing run
    #[arg(long, value_name = "ID")]
    pub run_id: Option<String>,

    /// Link to the producing run
    #[arg(long, value_name = "URL")]
    pub run_url: Option<String>,

    /// Commit the run was built from
    #[arg(long, value_name = "SHA")]
    pub sha: Option<String>,
}
