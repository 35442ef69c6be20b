//! Race configuration.

use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::locator::SelectionPolicy;

/// Route booked when nothing else is set programmatically.
pub const DEFAULT_ROUTE: &str = "Martil";

/// Preload leads must be shorter than a day.
pub const MAX_PRELOAD_LEAD_SECS: u64 = 24 * 60 * 60;

/// Configuration for a booking race.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Route name departures are filtered by.
    /// Not read from config files or the environment.
    #[serde(skip, default = "default_route")]
    pub route: String,

    /// IANA timezone the target time of day is interpreted in.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// How long before the target the departure list is pre-fetched (seconds).
    #[serde(default = "default_preload_lead")]
    pub preload_lead_secs: u64,

    /// Booking attempts before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause between a failed attempt and the next one (milliseconds).
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,

    /// Which departure wins when several are eligible.
    #[serde(default)]
    pub selection_policy: SelectionPolicy,

    /// How often the waiter logs the remaining time (seconds).
    #[serde(default = "default_progress_interval")]
    pub progress_interval_secs: u64,
}

fn default_route() -> String {
    DEFAULT_ROUTE.to_string()
}

fn default_timezone() -> String {
    "Africa/Casablanca".to_string()
}

fn default_preload_lead() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff() -> u64 {
    150
}

fn default_progress_interval() -> u64 {
    10
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            route: default_route(),
            timezone: default_timezone(),
            preload_lead_secs: default_preload_lead(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff(),
            selection_policy: SelectionPolicy::default(),
            progress_interval_secs: default_progress_interval(),
        }
    }
}

impl RaceConfig {
    /// Parsed timezone, `None` if the identifier is unknown.
    pub fn tz(&self) -> Option<Tz> {
        self.timezone.parse().ok()
    }

    pub fn preload_lead(&self) -> Duration {
        Duration::from_secs(self.preload_lead_secs)
    }

    /// Preload lead as a signed delta, `None` if it is a day or longer.
    pub fn preload_lead_delta(&self) -> Option<chrono::TimeDelta> {
        if self.preload_lead_secs >= MAX_PRELOAD_LEAD_SECS {
            return None;
        }
        i64::try_from(self.preload_lead_secs)
            .ok()
            .and_then(chrono::TimeDelta::try_seconds)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_secs(self.progress_interval_secs)
    }
}
