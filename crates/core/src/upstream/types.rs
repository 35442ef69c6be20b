//! Types for upstream API operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while talking to the bus API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Protocol(String),

    #[error("Received a login page instead of JSON (session expired?): {0}")]
    LoginPage(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl UpstreamError {
    /// Whether the request never produced an HTTP response.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            UpstreamError::ConnectionFailed(_) | UpstreamError::Timeout | UpstreamError::Transport(_)
        )
    }

    /// Whether a response arrived but was not usable data.
    pub fn is_protocol(&self) -> bool {
        matches!(self, UpstreamError::Protocol(_) | UpstreamError::LoginPage(_))
    }
}

/// A route a departure runs on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub name: String,
}

/// A departure as reported by `GET /departure/current`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Departure {
    /// Upstream-assigned id. Newer departures have larger ids.
    pub id: i64,
    /// Booking is closed for this departure.
    #[serde(default)]
    pub locked: bool,
    pub route: Route,
    /// Free seats toward home. Missing in some API versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbr_to_home: Option<u32>,
    /// Free seats toward campus. Missing in some API versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbr_to_campus: Option<u32>,
    /// Scheduled time as sent by upstream, unparsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<String>,
}

impl Departure {
    /// Whether the API reported seat counters at all.
    pub fn has_seat_counters(&self) -> bool {
        self.nbr_to_home.is_some() || self.nbr_to_campus.is_some()
    }
}

/// Body of `POST /tickets/book`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub departure_id: i64,
    pub to_campus: bool,
}

/// Raw answer to a booking request, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingResponse {
    pub status: u16,
    pub body: String,
}

/// The upstream bus API.
#[async_trait]
pub trait BusApi: Send + Sync {
    /// Returns the API name for logging.
    fn name(&self) -> &str;

    /// Fetch the current departure list.
    async fn current_departures(&self) -> Result<Vec<Departure>, UpstreamError>;

    /// Submit a booking. Any HTTP response, successful or not, is `Ok`;
    /// only transport failures are errors.
    async fn book(&self, request: &BookingRequest) -> Result<BookingResponse, UpstreamError>;
}
