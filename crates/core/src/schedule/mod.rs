//! Turning a wall-clock time into an instant and sleeping precisely until it.
//!
//! - [`resolve_target`] maps "HH:MM[:SS]" onto the next future instant in a
//!   fixed timezone.
//! - [`PrecisionWaiter`] blocks until an instant using a tiered sleep policy
//!   so the final overshoot stays within a few milliseconds.
//! - [`Clock`] abstracts wall time and sleeping so both can be faked in tests.

mod clock;
mod target;
mod waiter;

pub use clock::{Clock, SystemClock};
pub use target::{parse_time_of_day, resolve_target, TargetError};
pub use waiter::{PrecisionWaiter, SleepPolicy};
