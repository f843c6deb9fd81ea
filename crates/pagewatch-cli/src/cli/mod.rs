//! Command-line interface definition for pagewatch.
//!
//! # Command Structure
//!
//! - `pagewatch check` - Load a page in headless Chrome and write a report
//! - `pagewatch history` - Fold the latest report into the rolling history

mod commands;
mod tests;

use clap::Parser;

pub use commands::{CheckArgs, Command, HistoryArgs};

/// pagewatch - scheduled health checks for a web page
#[derive(Parser, Debug)]
#[command(
    name = "pagewatch",
    version,
    about = "Scheduled headless-browser health checks for a single web page",
    long_about = "pagewatch loads one page in headless Chrome, records script errors,\n\
                  console errors and warnings, failed requests and the HTTP status,\n\
                  checks for expected and forbidden text, and writes a JSON report.\n\
                  A second command folds reports into a bounded rolling history."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
