//! Polling waits with a timeout.
//!
//! The `DevTools` protocol has no "network idle" event, so quiescence is
//! detected by polling a condition derived from observed request traffic.

use crate::error::{BrowserError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Default timeout for wait operations (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default poll interval for checking conditions (100ms).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Timeout and poll interval of a wait.
#[derive(Debug, Clone, Copy)]
pub struct WaitConfig {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitConfig {
    #[must_use]
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Custom timeout, default poll interval.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(timeout, DEFAULT_POLL_INTERVAL)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

/// Polls `condition` until it holds, returning how long that took.
///
/// The condition is checked once immediately, then every `poll_interval`.
///
/// # Errors
///
/// Returns [`BrowserError::WaitTimeout`] naming `description` when the
/// condition still does not hold after `timeout`.
pub async fn poll_until<F, Fut>(
    condition: F,
    config: WaitConfig,
    description: &str,
) -> Result<Duration>
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = Instant::now();

    loop {
        if condition().await {
            return Ok(start.elapsed());
        }

        if start.elapsed() >= config.timeout {
            return Err(BrowserError::WaitTimeout {
                condition: description.to_string(),
                timeout: config.timeout,
            });
        }

        sleep(config.poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn already_idle_returns_at_once() {
        let waited = poll_until(|| async { true }, WaitConfig::default(), "network idle")
            .await
            .unwrap();

        assert!(waited < DEFAULT_POLL_INTERVAL);
    }

    #[tokio::test]
    async fn waits_for_in_flight_requests_to_drain() {
        let in_flight = Arc::new(AtomicUsize::new(3));
        let counter = in_flight.clone();

        let result = poll_until(
            move || {
                let counter = counter.clone();
                async move {
                    // each poll lets one request finish
                    let before = counter.load(Ordering::SeqCst);
                    if before > 0 {
                        counter.store(before - 1, Ordering::SeqCst);
                    }
                    before == 0
                }
            },
            WaitConfig::new(Duration::from_secs(5), Duration::from_millis(5)),
            "network idle",
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn long_polling_page_times_out() {
        let result = poll_until(
            || async { false },
            WaitConfig::new(Duration::from_millis(100), Duration::from_millis(10)),
            "network idle",
        )
        .await;

        match result {
            Err(BrowserError::WaitTimeout { condition, timeout }) => {
                assert_eq!(condition, "network idle");
                assert_eq!(timeout, Duration::from_millis(100));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
