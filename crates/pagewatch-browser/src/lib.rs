//! # pagewatch-browser
//!
//! Drives headless Chrome through chromiumoxide for one page check and
//! turns what the page reports into typed diagnostics.
//!
//! ## Architecture
//!
//! - **HeadlessBrowser**: launches and shuts down the Chrome process
//! - **PageSession**: the seam the collector talks to; [`Page`] implements
//!   it over the `DevTools` protocol
//! - **NetworkActivity**: in-flight request tracking for the idle wait
//! - **SignalCollector**: attach, navigate, settle, read, detach
//!
//! Page events reach the collector over a bounded channel. Ignore patterns
//! are applied as records arrive.
//!
//! ## Example
//!
//! ```ignore
//! use pagewatch_browser::{
//!     BrowserSettings, CollectorSettings, HeadlessBrowser, SignalCollector, observe,
//! };
//! use pagewatch_core::IgnorePatterns;
//!
//! let browser = HeadlessBrowser::launch(BrowserSettings::default()).await?;
//! let collector = SignalCollector::new(CollectorSettings::default(), IgnorePatterns::default());
//! let observation = observe(&browser, &collector, "https://example.com").await;
//! browser.close().await?;
//! ```
//!
//! ## Testing
//!
//! Unit tests and the collector tests run without a browser. Tests that
//! launch Chrome are `#[ignore]`; run them with `cargo test -- --ignored`.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod browser;
pub mod collector;
pub mod console;
pub mod error;
pub mod exception;
pub mod network;
pub mod page;
pub mod session;
pub mod wait;

// Re-export main types for convenience
pub use browser::{BrowserSettings, DEFAULT_REQUEST_TIMEOUT, DEFAULT_USER_AGENT, HeadlessBrowser};
pub use collector::{CollectorSettings, Observation, SignalCollector, observe};
pub use console::ConsoleLevel;
pub use error::{BrowserError, Result};
pub use network::{NETWORK_IDLE_WINDOW, NetworkActivity};
pub use page::Page;
pub use session::PageSession;
pub use wait::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, WaitConfig, poll_until};
