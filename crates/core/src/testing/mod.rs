//! Testing utilities and mock implementations.
//!
//! This module provides a scripted mock of the bus API and a manually driven
//! clock, so whole races can run without a network or real time passing.
//!
//! # Example
//!
//! ```rust,ignore
//! use busrace_core::testing::{fixtures, ManualClock, MockBusApi};
//!
//! let api = MockBusApi::new();
//! api.set_departures(vec![fixtures::departure(5, "Martil", 3, 0)]).await;
//! api.push_booking(Ok(fixtures::rejected(409, "seat taken"))).await;
//!
//! let clock = ManualClock::new(start);
//! // Use in RaceOrchestrator::new(config, Arc::new(api), Arc::new(clock))...
//! ```

mod manual_clock;
mod mock_bus_api;

pub use manual_clock::ManualClock;
pub use mock_bus_api::{MockBusApi, RecordedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::upstream::{BookingResponse, Departure, Route};

    /// A departure with explicit seat counters.
    pub fn departure(id: i64, route: &str, to_home: u32, to_campus: u32) -> Departure {
        Departure {
            id,
            locked: false,
            route: Route {
                name: route.to_string(),
            },
            nbr_to_home: Some(to_home),
            nbr_to_campus: Some(to_campus),
            departure_time: None,
        }
    }

    /// A departure from an API version that reports no seat counters.
    pub fn departure_without_counters(id: i64, route: &str) -> Departure {
        Departure {
            id,
            locked: false,
            route: Route {
                name: route.to_string(),
            },
            nbr_to_home: None,
            nbr_to_campus: None,
            departure_time: None,
        }
    }

    /// A successful booking response.
    pub fn created() -> BookingResponse {
        BookingResponse {
            status: 201,
            body: r#"{"status":"booked"}"#.to_string(),
        }
    }

    /// A refused booking response.
    pub fn rejected(status: u16, body: &str) -> BookingResponse {
        BookingResponse {
            status,
            body: body.to_string(),
        }
    }
}
