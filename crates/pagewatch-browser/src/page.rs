//! Chrome tab implementing [`PageSession`].
//!
//! `attach` subscribes to the `Runtime`, `Log` and `Network` event streams before
//! returning and spawns one forwarding task per concern. Each task owns a
//! clone of the diagnostics sender; `detach` aborts the tasks and waits for
//! them so those clones are gone when it returns.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::log::{self, EventEntryAdded};
use chromiumoxide::cdp::browser_protocol::network::{
    self, EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
    EventResponseReceived, ResourceType,
};
use chromiumoxide::cdp::browser_protocol::page::{EventDomContentEventFired, NavigateParams};
use chromiumoxide::cdp::js_protocol::runtime::{
    self, EventConsoleApiCalled, EventExceptionThrown,
};
use chromiumoxide::page::Page as ChromePage;
use futures::StreamExt;
use pagewatch_core::DiagnosticRecord;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::console::{console_message, log_entry_message};
use crate::error::{BrowserError, Result};
use crate::exception::page_error;
use crate::network::{NETWORK_IDLE_WINDOW, NetworkActivity, RequestTable, resource_type_name};
use crate::session::PageSession;
use crate::wait::{WaitConfig, poll_until};

/// How long `navigate` keeps waiting for the document response event after
/// DOMContentLoaded.
const STATUS_GRACE: Duration = Duration::from_secs(1);

/// Turns the `errorText` of a `Page.navigate` reply into a navigation
/// failure. Chrome reports DNS and connection errors this way instead of
/// failing the command.
fn navigation_result(url: &str, error_text: Option<&str>) -> Result<()> {
    match error_text.map(str::trim).filter(|text| !text.is_empty()) {
        Some(text) => Err(BrowserError::NavigationFailed {
            url: url.to_string(),
            reason: text.to_string(),
        }),
        None => Ok(()),
    }
}

/// A browser tab.
#[derive(Debug)]
pub struct Page {
    inner: ChromePage,
    network: Arc<NetworkActivity>,
    listeners: Vec<JoinHandle<()>>,
}

impl Page {
    pub(crate) fn new(page: ChromePage) -> Self {
        Self {
            inner: page,
            network: Arc::new(NetworkActivity::new()),
            listeners: Vec::new(),
        }
    }

    /// Requests currently in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.network.in_flight()
    }

    /// Closes the tab, stopping any listener still running.
    ///
    /// # Errors
    ///
    /// Returns an error if Chrome refuses to close the target.
    pub async fn close(mut self) -> Result<()> {
        self.stop_listeners().await;
        self.inner.clone().close().await?;
        Ok(())
    }

    async fn stop_listeners(&mut self) {
        for handle in self.listeners.drain(..) {
            handle.abort();
            // a cancelled JoinError is the expected outcome
            let _ = handle.await;
        }
    }

    async fn spawn_runtime_listeners(&mut self, events: &mpsc::Sender<DiagnosticRecord>) -> Result<()> {
        let mut exceptions = self.inner.event_listener::<EventExceptionThrown>().await?;
        let tx = events.clone();
        self.listeners.push(tokio::spawn(async move {
            while let Some(event) = exceptions.next().await {
                let error = page_error(&event);
                trace!(message = %error.message, "page error");
                if tx.send(error.into()).await.is_err() {
                    break;
                }
            }
        }));

        let mut console = self.inner.event_listener::<EventConsoleApiCalled>().await?;
        let tx = events.clone();
        self.listeners.push(tokio::spawn(async move {
            while let Some(event) = console.next().await {
                let Some(message) = console_message(&event) else {
                    continue;
                };
                trace!(severity = ?message.severity, "console message");
                if tx.send(message.into()).await.is_err() {
                    break;
                }
            }
        }));

        let mut entries = self.inner.event_listener::<EventEntryAdded>().await?;
        let tx = events.clone();
        self.listeners.push(tokio::spawn(async move {
            while let Some(event) = entries.next().await {
                let Some(message) = log_entry_message(&event.entry) else {
                    continue;
                };
                trace!(severity = ?message.severity, "browser log entry");
                if tx.send(message.into()).await.is_err() {
                    break;
                }
            }
        }));

        Ok(())
    }

    async fn spawn_network_listener(&mut self, events: &mpsc::Sender<DiagnosticRecord>) -> Result<()> {
        let mut started = self.inner.event_listener::<EventRequestWillBeSent>().await?;
        let mut finished = self.inner.event_listener::<EventLoadingFinished>().await?;
        let mut failed = self.inner.event_listener::<EventLoadingFailed>().await?;
        let mut responses = self.inner.event_listener::<EventResponseReceived>().await?;

        let tx = events.clone();
        let activity = Arc::clone(&self.network);
        self.listeners.push(tokio::spawn(async move {
            let mut requests = RequestTable::new();
            loop {
                tokio::select! {
                    Some(event) = started.next() => {
                        let id: &str = event.request_id.as_ref();
                        if requests.started(id, &event.request.url, &event.request.method) {
                            activity.request_started();
                        }
                    }
                    Some(event) = finished.next() => {
                        if requests.finished(event.request_id.as_ref()) {
                            activity.request_settled();
                        }
                    }
                    Some(event) = failed.next() => {
                        let resource_type = resource_type_name(&event.r#type);
                        let Some(failure) =
                            requests.failed(event.request_id.as_ref(), &resource_type, &event.error_text)
                        else {
                            continue;
                        };
                        activity.request_settled();
                        trace!(url = %failure.url, error = %failure.error_text, "request failed");
                        if tx.send(failure.into()).await.is_err() {
                            break;
                        }
                    }
                    Some(event) = responses.next() => {
                        if event.r#type == ResourceType::Document {
                            activity.record_document_status(event.response.status);
                        }
                    }
                    else => break,
                }
            }
        }));

        Ok(())
    }
}

#[async_trait]
impl PageSession for Page {
    async fn attach(&mut self, events: mpsc::Sender<DiagnosticRecord>) -> Result<()> {
        self.inner.execute(runtime::EnableParams::default()).await?;
        self.inner.execute(network::EnableParams::default()).await?;
        self.inner.execute(log::EnableParams::default()).await?;

        self.spawn_runtime_listeners(&events).await?;
        self.spawn_network_listener(&events).await?;
        debug!(listeners = self.listeners.len(), "page attached");
        Ok(())
    }

    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<Option<u16>> {
        let failed = |reason: String| BrowserError::NavigationFailed {
            url: url.to_string(),
            reason,
        };

        // subscribed first so a fast document cannot fire before we listen
        let mut content_ready = self
            .inner
            .event_listener::<EventDomContentEventFired>()
            .await?;

        // only DOMContentLoaded is awaited; a stalled subresource can hold
        // `load` back forever
        let navigation = async {
            let response = self
                .inner
                .execute(NavigateParams::new(url))
                .await
                .map_err(|e| failed(e.to_string()))?;
            navigation_result(url, response.result.error_text.as_deref())?;

            match content_ready.next().await {
                Some(_) => Ok::<(), BrowserError>(()),
                None => Err(failed("page closed before its content was ready".to_string())),
            }
        };

        match tokio::time::timeout(timeout, navigation).await {
            Err(_) => {
                return Err(failed(format!(
                    "content not ready after {}ms",
                    timeout.as_millis()
                )));
            }
            Ok(result) => result?,
        }

        // the response event is delivered on the network task and may trail DOMContentLoaded
        let network = Arc::clone(&self.network);
        let seen = poll_until(
            move || {
                let network = Arc::clone(&network);
                async move { network.document_status().is_some() }
            },
            WaitConfig::new(STATUS_GRACE, Duration::from_millis(20)),
            "document response",
        )
        .await;
        if seen.is_err() {
            debug!(url, "no document response observed");
        }

        Ok(self.network.document_status())
    }

    async fn wait_for_network_idle(&mut self, config: WaitConfig) -> Result<Duration> {
        let network = Arc::clone(&self.network);
        poll_until(
            move || {
                let network = Arc::clone(&network);
                async move { network.is_idle(NETWORK_IDLE_WINDOW) }
            },
            config,
            "network idle",
        )
        .await
    }

    async fn content(&mut self) -> Result<String> {
        self.inner
            .content()
            .await
            .map_err(|e| BrowserError::ContentUnavailable(e.to_string()))
    }

    async fn detach(&mut self) {
        self.stop_listeners().await;
        debug!("page detached");
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        if !self.listeners.is_empty() {
            warn!("page dropped while attached; aborting listeners");
            for handle in &self.listeners {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigate_reply_without_error_text_succeeds() {
        assert!(navigation_result("https://example.com/", None).is_ok());
        assert!(navigation_result("https://example.com/", Some("")).is_ok());
        assert!(navigation_result("https://example.com/", Some("  ")).is_ok());
    }

    #[test]
    fn navigate_reply_error_text_is_a_navigation_failure() {
        let err = navigation_result("https://nowhere.invalid/", Some("net::ERR_NAME_NOT_RESOLVED"))
            .unwrap_err();
        match err {
            BrowserError::NavigationFailed { url, reason } => {
                assert_eq!(url, "https://nowhere.invalid/");
                assert_eq!(reason, "net::ERR_NAME_NOT_RESOLVED");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
