//! Bus booking API abstraction.
//!
//! This module provides a `BusApi` trait over the two upstream endpoints the
//! race needs (listing current departures and booking a ticket) and an
//! HTTP implementation.

mod http;
mod types;

pub use http::HttpBusApi;
pub use types::*;
