use std::fmt;

use serde::{Deserialize, Serialize};

use super::STATUS_CREATED;

/// Result of a single booking attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    /// The ticket exists.
    Booked,
    /// Upstream answered with something other than "created".
    Rejected { status: u16, body: String },
    /// No response was received.
    TransportFailure(String),
}

impl BookingOutcome {
    /// Classify an HTTP response to a booking request.
    pub fn from_response(status: u16, body: String) -> Self {
        if status == STATUS_CREATED {
            BookingOutcome::Booked
        } else {
            BookingOutcome::Rejected { status, body }
        }
    }

    pub fn is_booked(&self) -> bool {
        matches!(self, BookingOutcome::Booked)
    }

    /// What kind of failure this is. `None` for a successful booking.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            BookingOutcome::Booked => None,
            BookingOutcome::Rejected { status, .. } => Some(match status {
                401 | 403 => FailureKind::Credential,
                500..=599 => FailureKind::UpstreamOutage,
                _ => FailureKind::SeatRace,
            }),
            BookingOutcome::TransportFailure(_) => Some(FailureKind::UpstreamOutage),
        }
    }
}

impl fmt::Display for BookingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingOutcome::Booked => write!(f, "booked"),
            BookingOutcome::Rejected { status, body } => {
                write!(f, "rejected with HTTP {}: {}", status, body)
            }
            BookingOutcome::TransportFailure(e) => write!(f, "transport failure: {}", e),
        }
    }
}

/// Broad cause of a failed booking, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The session token was refused.
    Credential,
    /// Lost to another client (seat taken, already booked, closed).
    SeatRace,
    /// Upstream unreachable or erroring.
    UpstreamOutage,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Credential => "credential rejected",
            FailureKind::SeatRace => "lost the seat race",
            FailureKind::UpstreamOutage => "upstream unavailable",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
