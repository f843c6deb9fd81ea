//! The browser session seam.
//!
//! [`PageSession`] is everything the signal collector needs from a browser
//! tab. The Chrome implementation lives in [`crate::page`]; tests drive the
//! collector with scripted in-memory sessions.

use std::time::Duration;

use async_trait::async_trait;
use pagewatch_core::DiagnosticRecord;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::wait::WaitConfig;

/// One observable page.
///
/// Call order is `attach`, `navigate`, any number of waits and reads, then
/// `detach`. Every record observed between `attach` and `detach` is sent to
/// the channel given to `attach`; after `detach` returns the session holds
/// no sender, so the receiving side sees the channel close.
#[async_trait]
pub trait PageSession: Send {
    /// Starts forwarding page errors, qualifying console messages and
    /// request failures. Must be subscribed before this returns.
    async fn attach(&mut self, events: mpsc::Sender<DiagnosticRecord>) -> Result<()>;

    /// Navigates and waits until the document is ready.
    ///
    /// Returns the main document's HTTP status when a response was seen.
    ///
    /// # Errors
    ///
    /// [`crate::BrowserError::NavigationFailed`] when the navigation errors
    /// or does not finish within `timeout`.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<Option<u16>>;

    /// Waits until no requests have been in flight for a short window.
    async fn wait_for_network_idle(&mut self, config: WaitConfig) -> Result<Duration>;

    /// The current rendered markup.
    async fn content(&mut self) -> Result<String>;

    /// Stops forwarding events and releases every sender clone.
    async fn detach(&mut self);
}
