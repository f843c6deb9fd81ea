//! Request bookkeeping derived from `Network.*` events.
//!
//! `Network.loadingFailed` carries only a request id, so the URL and method
//! of every request are remembered from `Network.requestWillBeSent` until the
//! request settles. The same events drive the in-flight counter used to
//! detect network quiescence.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::{Duration, Instant};

use chromiumoxide::cdp::browser_protocol::network::ResourceType;
use pagewatch_core::RequestFailure;

/// How long the network must stay quiet to count as idle.
pub const NETWORK_IDLE_WINDOW: Duration = Duration::from_millis(500);

/// Shared view of network traffic, updated by the page's event task and
/// read by waits.
#[derive(Debug)]
pub struct NetworkActivity {
    in_flight: AtomicUsize,
    last_change: Mutex<Instant>,
    document_status: OnceLock<u16>,
}

impl NetworkActivity {
    #[must_use]
    pub fn new() -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            last_change: Mutex::new(Instant::now()),
            document_status: OnceLock::new(),
        }
    }

    pub fn request_started(&self) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.touch();
    }

    pub fn request_settled(&self) {
        // saturating: never wrap below zero
        let _ = self
            .in_flight
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        self.touch();
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// True when nothing is in flight and nothing changed for `window`.
    #[must_use]
    pub fn is_idle(&self, window: Duration) -> bool {
        if self.in_flight() > 0 {
            return false;
        }
        let last = *self
            .last_change
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        last.elapsed() >= window
    }

    /// Records the main document's status; only the first call counts.
    pub fn record_document_status(&self, status: i64) {
        let status = u16::try_from(status).unwrap_or(0);
        let _ = self.document_status.set(status);
    }

    #[must_use]
    pub fn document_status(&self) -> Option<u16> {
        self.document_status.get().copied()
    }

    fn touch(&self) {
        *self
            .last_change
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }
}

impl Default for NetworkActivity {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
struct PendingRequest {
    url: String,
    method: String,
}

/// Requests seen since attach that have not settled yet.
#[derive(Debug, Default)]
pub struct RequestTable {
    pending: HashMap<String, PendingRequest>,
}

impl RequestTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers a request. Returns `false` when the id was already known,
    /// which is how Chrome reports a redirect hop.
    pub fn started(&mut self, request_id: &str, url: &str, method: &str) -> bool {
        let request = PendingRequest {
            url: url.to_string(),
            method: method.to_string(),
        };
        self.pending
            .insert(request_id.to_string(), request)
            .is_none()
    }

    /// Forgets a completed request. Returns `false` for unknown ids.
    pub fn finished(&mut self, request_id: &str) -> bool {
        self.pending.remove(request_id).is_some()
    }

    /// Forgets a failed request and describes the failure, or `None` when
    /// the request started before the table existed.
    pub fn failed(
        &mut self,
        request_id: &str,
        resource_type: &str,
        error_text: &str,
    ) -> Option<RequestFailure> {
        let request = self.pending.remove(request_id)?;
        Some(RequestFailure {
            url: request.url,
            method: request.method,
            resource_type: resource_type.to_string(),
            error_text: error_text.to_string(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Lower-case resource type name (`document`, `script`, `xhr`, ...).
#[must_use]
pub fn resource_type_name(resource_type: &ResourceType) -> String {
    format!("{resource_type:?}").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_request_joins_start_metadata() {
        let mut table = RequestTable::new();
        assert!(table.started("7.1", "https://ads.example/slot.js", "GET"));

        let failure = table
            .failed("7.1", "script", "net::ERR_BLOCKED_BY_CLIENT")
            .unwrap();
        assert_eq!(failure.url, "https://ads.example/slot.js");
        assert_eq!(failure.method, "GET");
        assert_eq!(failure.resource_type, "script");
        assert_eq!(failure.error_text, "net::ERR_BLOCKED_BY_CLIENT");
        assert!(table.is_empty());
    }

    #[test]
    fn redirect_hop_reuses_request_id() {
        let mut table = RequestTable::new();
        assert!(table.started("1", "http://example.com", "GET"));
        assert!(!table.started("1", "https://example.com", "GET"));
        assert_eq!(table.len(), 1);

        let failure = table.failed("1", "document", "net::ERR_TIMED_OUT").unwrap();
        assert_eq!(failure.url, "https://example.com");
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut table = RequestTable::new();
        assert!(!table.finished("missing"));
        assert!(table.failed("missing", "xhr", "net::ERR_FAILED").is_none());
    }

    #[test]
    fn in_flight_never_underflows() {
        let activity = NetworkActivity::new();
        activity.request_settled();
        assert_eq!(activity.in_flight(), 0);

        activity.request_started();
        activity.request_started();
        activity.request_settled();
        assert_eq!(activity.in_flight(), 1);
    }

    #[test]
    fn idle_requires_quiet_window() {
        let activity = NetworkActivity::new();
        activity.request_started();
        assert!(!activity.is_idle(Duration::ZERO));

        activity.request_settled();
        assert!(activity.is_idle(Duration::ZERO));
        assert!(!activity.is_idle(Duration::from_secs(3600)));
    }

    #[test]
    fn first_document_status_wins() {
        let activity = NetworkActivity::new();
        assert_eq!(activity.document_status(), None);

        activity.record_document_status(503);
        activity.record_document_status(200);
        assert_eq!(activity.document_status(), Some(503));
    }

    #[test]
    fn resource_types_are_lower_case() {
        assert_eq!(resource_type_name(&ResourceType::Script), "script");
        assert_eq!(resource_type_name(&ResourceType::Xhr), "xhr");
    }
}
