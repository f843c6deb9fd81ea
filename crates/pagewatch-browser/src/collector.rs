//! The signal collector: one navigate-and-settle cycle over a page session.
//!
//! Records flow from the session over a bounded channel into a drain task
//! that applies the ignore patterns on arrival, so ignored records are never
//! stored. The session is detached on every exit path, which closes the
//! channel and lets the drain task hand back what it accumulated.

use std::time::{Duration, Instant};

use pagewatch_core::{Diagnostics, IgnorePatterns};
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::browser::HeadlessBrowser;
use crate::error::{BrowserError, Result};
use crate::session::PageSession;
use crate::wait::WaitConfig;

/// Timing and buffering of one collection.
#[derive(Debug, Clone, Copy)]
pub struct CollectorSettings {
    /// Hard limit for navigation; exceeding it fails the run.
    pub navigation_timeout: Duration,
    /// Limit for the best-effort network idle wait.
    pub idle_timeout: Duration,
    /// Fixed delay after load for late scripts to report.
    pub settle_delay: Duration,
    /// Capacity of the event channel.
    pub event_buffer: usize,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_millis(30_000),
            idle_timeout: Duration::from_millis(45_000),
            settle_delay: Duration::from_millis(1_500),
            event_buffer: 256,
        }
    }
}

/// What one collection observed, before classification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observation {
    /// Main document status; 0 when no response was seen.
    pub status: u16,
    pub markup: String,
    /// Records that survived the ignore patterns, in arrival order per kind.
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone)]
pub struct SignalCollector {
    settings: CollectorSettings,
    ignore: IgnorePatterns,
}

impl SignalCollector {
    #[must_use]
    pub fn new(settings: CollectorSettings, ignore: IgnorePatterns) -> Self {
        Self { settings, ignore }
    }

    #[must_use]
    pub fn settings(&self) -> &CollectorSettings {
        &self.settings
    }

    /// Observes `url` through `session`.
    ///
    /// # Errors
    ///
    /// Fails when the session cannot attach, navigation fails or times out,
    /// or the markup cannot be read. A network idle timeout is not an error.
    pub async fn collect<S>(&self, session: &mut S, url: &str) -> Result<Observation>
    where
        S: PageSession + ?Sized,
    {
        let (tx, mut rx) = mpsc::channel(self.settings.event_buffer.max(1));
        let ignore = self.ignore.clone();
        let drain = tokio::spawn(async move {
            let mut diagnostics = Diagnostics::default();
            let mut ignored = 0usize;
            while let Some(record) = rx.recv().await {
                if ignore.is_ignored(&record) {
                    trace!(kind = record.kind(), "record ignored");
                    ignored += 1;
                    continue;
                }
                diagnostics.record(record);
            }
            (diagnostics, ignored)
        });

        let started = Instant::now();
        let outcome = match session.attach(tx).await {
            Ok(()) => self.run(session, url).await,
            Err(e) => Err(e),
        };
        session.detach().await;

        let (diagnostics, ignored) = drain
            .await
            .map_err(|e| BrowserError::EventPipeline(e.to_string()))?;
        let (status, markup) = outcome?;

        info!(
            url,
            status,
            page_errors = diagnostics.page_errors.len(),
            console_messages = diagnostics.console_messages.len(),
            request_failures = diagnostics.request_failures.len(),
            ignored,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "page observed"
        );

        Ok(Observation {
            status,
            markup,
            diagnostics,
        })
    }

    async fn run<S>(&self, session: &mut S, url: &str) -> Result<(u16, String)>
    where
        S: PageSession + ?Sized,
    {
        let status = session
            .navigate(url, self.settings.navigation_timeout)
            .await?
            .unwrap_or(0);
        debug!(url, status, "navigation finished");

        // long-polling pages never go idle; that alone is not a failure
        match session
            .wait_for_network_idle(WaitConfig::with_timeout(self.settings.idle_timeout))
            .await
        {
            Ok(waited) => debug!(waited_ms = waited.as_millis() as u64, "network idle"),
            Err(e) => debug!("network idle wait abandoned: {e}"),
        }

        if !self.settings.settle_delay.is_zero() {
            tokio::time::sleep(self.settings.settle_delay).await;
        }

        let markup = session.content().await?;
        Ok((status, markup))
    }
}

/// Opens a tab on `browser`, collects from it, and closes it again whatever
/// the outcome.
///
/// # Errors
///
/// Propagates page creation and collection failures. A failure to close the
/// tab is only logged.
pub async fn observe(
    browser: &HeadlessBrowser,
    collector: &SignalCollector,
    url: &str,
) -> Result<Observation> {
    let mut page = browser.new_page().await?;
    let observed = collector.collect(&mut page, url).await;
    if let Err(e) = page.close().await {
        debug!("closing page failed: {e}");
    }
    observed
}
