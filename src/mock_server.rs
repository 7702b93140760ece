// In-process doubles for the reservation API and the notifier.
// Used by the unit tests, the integration tests and the benches.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::{
    collections::{HashMap, VecDeque},
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::flight::BookedFlight;
use crate::notify::Notifier;
use crate::transport::{ApiClient, ApiError, ApiRequest, RequestMethod};

// Scripted API: responses are queued per (method, path).
// The last queued response for a route keeps being served once the queue drains.
#[derive(Default)]
pub struct MockReservationApi {
    request_count: AtomicUsize,
    responses: Mutex<HashMap<(RequestMethod, String), VecDeque<Value>>>,
    fail_next_requests: AtomicUsize,
    recent_requests: Mutex<Vec<ApiRequest>>,
}

impl MockReservationApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_response(&self, method: RequestMethod, path: impl Into<String>, response: Value) {
        self.responses
            .lock()
            .entry((method, path.into()))
            .or_default()
            .push_back(response);
    }

    // Fail the next `count` requests as if every retry had been used up
    pub fn fail_next_requests(&self, count: usize) {
        self.fail_next_requests.store(count, Ordering::SeqCst);
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.recent_requests.lock().clone()
    }

    fn next_response(&self, method: RequestMethod, path: &str) -> Option<Value> {
        let mut responses = self.responses.lock();
        let queue = responses.get_mut(&(method, path.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl ApiClient for MockReservationApi {
    async fn request(&self, request: ApiRequest) -> Result<Value, ApiError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.recent_requests.lock().push(request.clone());

        let should_fail = self
            .fail_next_requests
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(ApiError::RequestFailed {
                reason: "Internal Server Error".to_string(),
                status_code: 500,
                attempts: request.max_attempts.unwrap_or(1),
            });
        }

        self.next_response(request.method, &request.path)
            .ok_or_else(|| ApiError::RequestFailed {
                reason: "Not Found".to_string(),
                status_code: 404,
                attempts: request.max_attempts.unwrap_or(1),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    LowerFare {
        confirmation_number: String,
        price_info: String,
    },
    FlightUnavailable {
        confirmation_number: String,
    },
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn lower_fare(&self, flight: &BookedFlight, price_info: &str) {
        self.sent.lock().push(Notification::LowerFare {
            confirmation_number: flight.confirmation_number.clone(),
            price_info: price_info.to_string(),
        });
    }

    async fn flight_unavailable(&self, flight: &BookedFlight) {
        self.sent.lock().push(Notification::FlightUnavailable {
            confirmation_number: flight.confirmation_number.clone(),
        });
    }
}
