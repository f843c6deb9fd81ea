//! pagewatch CLI - scheduled health checks of a single web page.
//!
//! The binary wires the browser-driven signal collector
//! (`pagewatch-browser`) to the classifier and history merge
//! (`pagewatch-core`), adding configuration, logging, and file plumbing.
//!
//! # Architecture
//!
//! - [`cli`] - clap argument definitions
//! - [`config`] - layered configuration (defaults, file, environment, flags)
//! - [`commands`] - `check` and `history`
//! - [`history_source`] - prior history from a URL or a local file
//! - [`error`] - error types rendered through miette
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status lines on stderr
//!
//! # Exit codes
//!
//! `0` when the check passes or the history is written, `1` when the check
//! ran and failed, `2` when the run could not complete.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod history_source;
pub mod logger;
pub mod ui;

pub use commands::Outcome;
pub use error::{CliError, ConfigError, Result};
