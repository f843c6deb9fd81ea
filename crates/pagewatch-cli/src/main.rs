//! pagewatch - scheduled web page health checks.
//!
//! Parses arguments, initializes logging and colors, and dispatches to the
//! command. Errors are rendered through miette and exit with status 2.

use std::process::ExitCode;

use clap::Parser;
use pagewatch_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> ExitCode {
    // variables already set take precedence over .env
    let dotenv = dotenvy::dotenv();

    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("ignoring unreadable .env: {e}"),
    }

    let result = match args.command {
        cli::Command::Check(check_args) => commands::check_execute(check_args).await,
        cli::Command::History(history_args) => commands::history_execute(history_args).await,
    };

    match result {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            eprintln!("{:?}", error::cli_error_to_miette(err));
            ExitCode::from(commands::Outcome::Incomplete.code())
        }
    }
}
