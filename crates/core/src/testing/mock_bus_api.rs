//! Mock bus API for testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::schedule::Clock;
use crate::upstream::{BookingRequest, BookingResponse, BusApi, Departure, UpstreamError};

/// A recorded API call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    /// `current_departures` was called.
    Departures { at: Option<DateTime<Utc>> },
    /// `book` was called with this request.
    Book {
        request: BookingRequest,
        at: Option<DateTime<Utc>>,
    },
}

type Scripted<T> = Arc<RwLock<VecDeque<Result<T, UpstreamError>>>>;

/// Mock implementation of the BusApi trait.
///
/// Responses are scripted per endpoint: queued results are returned first,
/// in order, then every further call falls back to a default (the configured
/// departure list, or a "created" booking response).
///
/// When built with a clock, every recorded call carries the clock time it
/// was made at.
pub struct MockBusApi {
    departures: Arc<RwLock<Vec<Departure>>>,
    departure_script: Scripted<Vec<Departure>>,
    booking_script: Scripted<BookingResponse>,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    clock: Option<Arc<dyn Clock>>,
}

impl std::fmt::Debug for MockBusApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBusApi")
            .field("departures", &"<departures>")
            .field("calls", &"<calls>")
            .finish()
    }
}

impl Default for MockBusApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBusApi {
    /// Create a mock with no departures that accepts every booking.
    pub fn new() -> Self {
        Self {
            departures: Arc::new(RwLock::new(Vec::new())),
            departure_script: Arc::new(RwLock::new(VecDeque::new())),
            booking_script: Arc::new(RwLock::new(VecDeque::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            clock: None,
        }
    }

    /// Stamp recorded calls with times from `clock`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set the departure list returned once the script is empty.
    pub async fn set_departures(&self, departures: Vec<Departure>) {
        *self.departures.write().await = departures;
    }

    /// Queue one response for `current_departures`.
    pub async fn push_departures(&self, result: Result<Vec<Departure>, UpstreamError>) {
        self.departure_script.write().await.push_back(result);
    }

    /// Queue one response for `book`.
    pub async fn push_booking(&self, result: Result<BookingResponse, UpstreamError>) {
        self.booking_script.write().await.push_back(result);
    }

    /// All calls made so far, in order.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Number of `current_departures` calls.
    pub async fn departure_calls(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| matches!(c, RecordedCall::Departures { .. }))
            .count()
    }

    /// Booking requests in the order they were made.
    pub async fn booking_requests(&self) -> Vec<BookingRequest> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|c| match c {
                RecordedCall::Book { request, .. } => Some(*request),
                _ => None,
            })
            .collect()
    }

    fn stamp(&self) -> Option<DateTime<Utc>> {
        self.clock.as_ref().map(|c| c.now())
    }
}

#[async_trait]
impl BusApi for MockBusApi {
    fn name(&self) -> &str {
        "mock"
    }

    async fn current_departures(&self) -> Result<Vec<Departure>, UpstreamError> {
        self.calls
            .write()
            .await
            .push(RecordedCall::Departures { at: self.stamp() });

        if let Some(result) = self.departure_script.write().await.pop_front() {
            return result;
        }
        Ok(self.departures.read().await.clone())
    }

    async fn book(&self, request: &BookingRequest) -> Result<BookingResponse, UpstreamError> {
        self.calls.write().await.push(RecordedCall::Book {
            request: *request,
            at: self.stamp(),
        });

        if let Some(result) = self.booking_script.write().await.pop_front() {
            return result;
        }
        Ok(super::fixtures::created())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_script_then_default() {
        let api = MockBusApi::new();
        api.set_departures(vec![fixtures::departure(1, "Martil", 1, 0)])
            .await;
        api.push_departures(Err(UpstreamError::Timeout)).await;
        api.push_departures(Ok(vec![])).await;

        assert_eq!(api.current_departures().await, Err(UpstreamError::Timeout));
        assert_eq!(api.current_departures().await, Ok(vec![]));
        assert_eq!(api.current_departures().await.unwrap().len(), 1);
        assert_eq!(api.departure_calls().await, 3);
    }

    #[tokio::test]
    async fn test_booking_defaults_to_created() {
        let api = MockBusApi::new();
        let request = BookingRequest {
            departure_id: 9,
            to_campus: true,
        };

        let response = api.book(&request).await.unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(api.booking_requests().await, vec![request]);
    }
}
