//! Command implementations for the pagewatch CLI.
//!
//! - [`check`] - observe the target page once and write a report
//! - [`history`] - fold the latest report into the rolling history
//!
//! Each command provides an `execute` function that takes the parsed
//! arguments and returns an [`Outcome`]. Errors returned from `execute`
//! mean the invocation could not complete.

use std::process::ExitCode;

pub mod check;
pub mod history;
pub(crate) mod utils;

pub use check::execute as check_execute;
pub use history::execute as history_execute;

/// How a command finished, mapped to the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The check passed, or the history was written.
    Passed,
    /// The check ran and failed its policy.
    Failed,
    /// No page could be observed.
    Incomplete,
}

impl Outcome {
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Outcome::Passed => 0,
            Outcome::Failed => 1,
            Outcome::Incomplete => 2,
        }
    }

    #[must_use]
    pub fn exit_code(self) -> ExitCode {
        ExitCode::from(self.code())
    }
}
