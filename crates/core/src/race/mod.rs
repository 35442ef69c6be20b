//! Booking race orchestration.
//!
//! The race is a linear state machine:
//! `Idle → TargetResolved → AwaitingPreload → Preloaded → AwaitingTarget →
//! Booking(1..=N) → Done`. Every transition happens on a single task and
//! at most one request is in flight at any time.

mod config;
mod runner;
mod types;

pub use config::{RaceConfig, DEFAULT_ROUTE, MAX_PRELOAD_LEAD_SECS};
pub use runner::{RaceOrchestrator, TransitionObserver};
pub use types::{RaceError, RaceReport, RaceState};
