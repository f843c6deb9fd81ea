//! Logging setup for the pagewatch binary.
//!
//! All crates log through `tracing`; this module installs the one
//! subscriber. Logs go to stderr so they never mix with machine-readable
//! output.
//!
//! ```rust,no_run
//! use pagewatch_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("checking page");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const CRATES: [&str; 3] = ["pagewatch_core", "pagewatch_browser", "pagewatch_cli"];

/// Builds the filter for the given verbosity.
///
/// `--verbose` wins over `--quiet`; with neither, `RUST_LOG` is honoured
/// and falls back to info for the pagewatch crates.
pub fn build_filter(verbose: bool, quiet: bool) -> EnvFilter {
    let directives = |level: &str| {
        CRATES
            .iter()
            .map(|krate| format!("{krate}={level}"))
            .collect::<Vec<_>>()
            .join(",")
    };

    if verbose {
        EnvFilter::new(directives("debug"))
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives("info")))
    }
}

/// Initialize the global subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && crate::ui::should_use_color())
        .compact();

    // a second initialisation (tests) is not an error worth failing on
    let _ = tracing_subscriber::registry()
        .with(build_filter(verbose, quiet))
        .with(fmt_layer)
        .try_init();
}
