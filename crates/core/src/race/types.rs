//! Types for the booking race.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use thiserror::Error;

use crate::booking::{BookingOutcome, FailureKind};
use crate::locator::Selection;
use crate::schedule::TargetError;
use crate::upstream::UpstreamError;

/// Fatal race failures.
#[derive(Debug, Error)]
pub enum RaceError {
    /// The target time could not be parsed or placed on the calendar.
    #[error("invalid target time: {0}")]
    InvalidTarget(#[from] TargetError),

    /// Configuration unusable for a race.
    #[error("invalid race configuration: {0}")]
    Config(String),

    /// The departure list was fetched at target time but nothing was bookable.
    #[error("no bookable departure on route {route}")]
    NoDeparture { route: String },

    /// The departure list could not be fetched at target time.
    #[error("could not fetch departures at target time: {0}")]
    DepartureUnavailable(UpstreamError),

    /// Every booking attempt failed.
    #[error("booking failed after {attempts} attempts ({kind}): {last}")]
    Exhausted {
        attempts: u32,
        kind: FailureKind,
        last: BookingOutcome,
    },
}

impl RaceError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            RaceError::InvalidTarget(_) => 2,
            RaceError::NoDeparture { .. } | RaceError::DepartureUnavailable(_) => 3,
            RaceError::Exhausted { .. } => 4,
            RaceError::Config(_) => 1,
        }
    }

    /// Broad cause, when one can be told apart.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            RaceError::Exhausted { kind, .. } => Some(*kind),
            RaceError::DepartureUnavailable(e) => match e {
                UpstreamError::LoginPage(_) => Some(FailureKind::Credential),
                UpstreamError::Status { status: 401 | 403, .. } => Some(FailureKind::Credential),
                UpstreamError::Status { .. } => Some(FailureKind::UpstreamOutage),
                e if e.is_transport() => Some(FailureKind::UpstreamOutage),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Summary of a successful race.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceReport {
    /// The resolved target instant.
    pub target: DateTime<Tz>,
    /// The departure and direction that got booked.
    pub selection: Selection,
    /// Booking attempts made, including the successful one.
    pub attempts: u32,
    /// Departure refreshes performed between attempts.
    pub refreshes: u32,
    /// When the successful booking response was received.
    pub booked_at: DateTime<Utc>,
}

/// A state of the race.
#[derive(Debug)]
pub enum RaceState {
    Idle {
        input: String,
    },
    TargetResolved {
        target: DateTime<Tz>,
    },
    AwaitingPreload {
        target: DateTime<Tz>,
    },
    Preloaded {
        target: DateTime<Tz>,
        cached: Option<Selection>,
    },
    AwaitingTarget {
        target: DateTime<Tz>,
        cached: Option<Selection>,
    },
    Booking {
        target: DateTime<Tz>,
        selection: Selection,
        attempt: u32,
        refreshes: u32,
    },
    Done(Result<RaceReport, RaceError>),
}

impl RaceState {
    /// Returns the state name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            RaceState::Idle { .. } => "idle",
            RaceState::TargetResolved { .. } => "target_resolved",
            RaceState::AwaitingPreload { .. } => "awaiting_preload",
            RaceState::Preloaded { .. } => "preloaded",
            RaceState::AwaitingTarget { .. } => "awaiting_target",
            RaceState::Booking { .. } => "booking",
            RaceState::Done(Ok(_)) => "done_success",
            RaceState::Done(Err(_)) => "done_failure",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, RaceState::Done(_))
    }
}
