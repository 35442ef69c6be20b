//! Ticket booker.
//!
//! Issues a single booking request and classifies what came back. Retrying
//! is left to the caller since a retry may need a different departure.

mod types;

pub use types::{BookingOutcome, FailureKind};

use std::sync::Arc;

use tracing::{debug, warn};

use crate::locator::Selection;
use crate::upstream::{BookingRequest, BusApi};

/// HTTP status the booking endpoint answers with on success.
pub const STATUS_CREATED: u16 = 201;

/// Books tickets through a [`BusApi`].
pub struct TicketBooker {
    api: Arc<dyn BusApi>,
}

impl TicketBooker {
    pub fn new(api: Arc<dyn BusApi>) -> Self {
        Self { api }
    }

    /// Attempt to book `selection` once.
    pub async fn book(&self, selection: &Selection) -> BookingOutcome {
        let request = BookingRequest {
            departure_id: selection.departure_id,
            to_campus: selection.direction.to_campus(),
        };

        let outcome = match self.api.book(&request).await {
            Ok(response) => BookingOutcome::from_response(response.status, response.body),
            Err(e) => BookingOutcome::TransportFailure(e.to_string()),
        };

        match &outcome {
            BookingOutcome::Booked => debug!(departure_id = request.departure_id, "Booking created"),
            BookingOutcome::Rejected { status, body } => warn!(
                departure_id = request.departure_id,
                status,
                body = %body,
                "Booking rejected"
            ),
            BookingOutcome::TransportFailure(e) => warn!(
                departure_id = request.departure_id,
                error = %e,
                "Booking request failed"
            ),
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::Direction;
    use crate::testing::MockBusApi;
    use crate::upstream::{BookingResponse, UpstreamError};

    fn selection(id: i64, direction: Direction) -> Selection {
        Selection {
            departure_id: id,
            direction,
        }
    }

    #[tokio::test]
    async fn test_book_created_is_booked() {
        let api = Arc::new(MockBusApi::new());
        api.push_booking(Ok(BookingResponse {
            status: 201,
            body: "{}".to_string(),
        }))
        .await;

        let booker = TicketBooker::new(api.clone());
        let outcome = booker.book(&selection(5, Direction::ToCampus)).await;

        assert_eq!(outcome, BookingOutcome::Booked);
        let requests = api.booking_requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].departure_id, 5);
        assert!(requests[0].to_campus);
    }

    #[tokio::test]
    async fn test_book_other_statuses_are_rejected() {
        for status in [200, 400, 409, 500] {
            let api = Arc::new(MockBusApi::new());
            api.push_booking(Ok(BookingResponse {
                status,
                body: "no seats".to_string(),
            }))
            .await;

            let outcome = TicketBooker::new(api)
                .book(&selection(5, Direction::ToHome))
                .await;

            assert_eq!(
                outcome,
                BookingOutcome::Rejected {
                    status,
                    body: "no seats".to_string()
                }
            );
        }
    }

    #[tokio::test]
    async fn test_book_transport_error() {
        let api = Arc::new(MockBusApi::new());
        api.push_booking(Err(UpstreamError::Timeout)).await;

        let outcome = TicketBooker::new(api)
            .book(&selection(5, Direction::ToHome))
            .await;

        assert_eq!(
            outcome,
            BookingOutcome::TransportFailure("Request timeout".to_string())
        );
    }
}
