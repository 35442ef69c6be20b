//! Precision waiter.
//!
//! Sleeping once for the whole wait would overshoot by whatever the timer
//! slack happens to be. Instead the waiter polls the clock and sleeps in
//! steps that shrink as the target approaches, so most of the wait is spent
//! in coarse sleeps and only the final few milliseconds are finely sliced.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::Clock;

/// Maps the remaining wait onto the next sleep step.
#[derive(Debug, Clone)]
pub struct SleepPolicy {
    /// `(threshold, step)` pairs, checked in order: the first tier whose
    /// threshold is below the remaining time supplies the step.
    tiers: Vec<(Duration, Duration)>,
    /// Step used once the remaining time is below every threshold.
    min_step: Duration,
}

impl Default for SleepPolicy {
    fn default() -> Self {
        Self {
            tiers: vec![
                (Duration::from_secs(1), Duration::from_millis(500)),
                (Duration::from_millis(100), Duration::from_millis(10)),
                (Duration::from_millis(10), Duration::from_millis(1)),
            ],
            min_step: Duration::from_micros(250),
        }
    }
}

impl SleepPolicy {
    /// Build a policy from explicit tiers. Tiers are sorted by descending
    /// threshold.
    pub fn new(mut tiers: Vec<(Duration, Duration)>, min_step: Duration) -> Self {
        tiers.sort_by(|a, b| b.0.cmp(&a.0));
        Self { tiers, min_step }
    }

    /// How long to sleep next. Never exceeds `remaining`.
    pub fn next_step(&self, remaining: Duration) -> Duration {
        let step = self
            .tiers
            .iter()
            .find(|(threshold, _)| remaining > *threshold)
            .map(|(_, step)| *step)
            .unwrap_or(self.min_step);
        step.min(remaining)
    }
}

/// Blocks the caller until a wall-clock instant has been reached.
pub struct PrecisionWaiter {
    clock: Arc<dyn Clock>,
    policy: SleepPolicy,
    progress_interval: Duration,
}

impl PrecisionWaiter {
    /// Create a waiter with the default sleep policy.
    pub fn new(clock: Arc<dyn Clock>, progress_interval: Duration) -> Self {
        Self {
            clock,
            policy: SleepPolicy::default(),
            progress_interval,
        }
    }

    /// Replace the sleep policy.
    pub fn with_policy(mut self, policy: SleepPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Wait until `clock.now() >= target`.
    ///
    /// Returns how far past the target the clock was when the wait ended.
    /// A target in the past returns immediately.
    pub async fn wait_until(&self, target: DateTime<Utc>, label: &str) -> Duration {
        let mut last_report: Option<DateTime<Utc>> = None;

        loop {
            let now = self.clock.now();
            if now >= target {
                break;
            }

            let remaining = (target - now).to_std().unwrap_or_default();

            if remaining > Duration::from_secs(1) {
                let due = match last_report {
                    Some(at) => (now - at).to_std().unwrap_or_default() >= self.progress_interval,
                    None => true,
                };
                if due {
                    info!(label, remaining_secs = remaining.as_secs(), "{} in {}s", label, remaining.as_secs());
                    last_report = Some(now);
                }
            }

            self.clock.sleep(self.policy.next_step(remaining)).await;
        }

        let overshoot = (self.clock.now() - target).to_std().unwrap_or_default();
        debug!(
            label,
            overshoot_us = overshoot.as_micros() as u64,
            "Wait finished"
        );
        overshoot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::SystemClock;
    use crate::testing::ManualClock;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_policy_tiers() {
        let policy = SleepPolicy::default();
        assert_eq!(policy.next_step(Duration::from_secs(30)), Duration::from_millis(500));
        assert_eq!(policy.next_step(Duration::from_millis(1500)), Duration::from_millis(500));
        assert_eq!(policy.next_step(Duration::from_millis(1000)), Duration::from_millis(10));
        assert_eq!(policy.next_step(Duration::from_millis(500)), Duration::from_millis(10));
        assert_eq!(policy.next_step(Duration::from_millis(50)), Duration::from_millis(1));
        assert_eq!(policy.next_step(Duration::from_millis(5)), Duration::from_micros(250));
    }

    #[test]
    fn test_policy_never_exceeds_remaining() {
        let policy = SleepPolicy::default();
        assert_eq!(policy.next_step(Duration::from_micros(100)), Duration::from_micros(100));
        assert_eq!(policy.next_step(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_custom_policy_sorts_tiers() {
        let policy = SleepPolicy::new(
            vec![
                (Duration::from_millis(10), Duration::from_millis(2)),
                (Duration::from_secs(5), Duration::from_secs(1)),
            ],
            Duration::from_millis(1),
        );
        assert_eq!(policy.next_step(Duration::from_secs(10)), Duration::from_secs(1));
        assert_eq!(policy.next_step(Duration::from_secs(2)), Duration::from_millis(2));
        assert_eq!(policy.next_step(Duration::from_millis(5)), Duration::from_millis(1));
    }

    #[tokio::test]
    async fn test_wait_ends_exactly_at_target_with_manual_clock() {
        let clock = Arc::new(ManualClock::new(utc("2024-06-15T09:59:00Z")));
        let waiter = PrecisionWaiter::new(clock.clone(), Duration::from_secs(10));

        let target = utc("2024-06-15T10:00:00Z");
        let overshoot = waiter.wait_until(target, "Booking").await;

        assert_eq!(overshoot, Duration::ZERO);
        assert_eq!(clock.now(), target);
    }

    #[tokio::test]
    async fn test_wait_does_not_spin_on_long_waits() {
        let clock = Arc::new(ManualClock::new(utc("2024-06-15T09:00:00Z")));
        let waiter = PrecisionWaiter::new(clock.clone(), Duration::from_secs(10));

        waiter.wait_until(utc("2024-06-15T10:00:00Z"), "Preload").await;

        // One hour of coarse steps plus the fine tail
        let sleeps = clock.sleeps();
        assert!(sleeps.len() < 7500, "too many sleeps: {}", sleeps.len());
        let coarse = sleeps
            .iter()
            .filter(|d| **d == Duration::from_millis(500))
            .count();
        assert!(coarse > 7000);
    }

    #[tokio::test]
    async fn test_wait_in_the_past_returns_immediately() {
        let clock = Arc::new(ManualClock::new(utc("2024-06-15T10:00:05Z")));
        let waiter = PrecisionWaiter::new(clock.clone(), Duration::from_secs(10));

        let overshoot = waiter.wait_until(utc("2024-06-15T10:00:00Z"), "Booking").await;

        assert_eq!(overshoot, Duration::from_secs(5));
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_wait_reports_late_clock_overshoot() {
        let clock = Arc::new(
            ManualClock::new(utc("2024-06-15T09:59:59Z")).with_lateness(Duration::from_millis(3)),
        );
        let waiter = PrecisionWaiter::new(clock.clone(), Duration::from_secs(10));

        let overshoot = waiter.wait_until(utc("2024-06-15T10:00:00Z"), "Booking").await;

        assert!(overshoot <= Duration::from_millis(3));
    }

    #[tokio::test]
    async fn test_wait_with_system_clock_has_small_overshoot() {
        let waiter = PrecisionWaiter::new(Arc::new(SystemClock), Duration::from_secs(10));

        for _ in 0..3 {
            let target = Utc::now() + chrono::Duration::milliseconds(120);
            let overshoot = waiter.wait_until(target, "Test").await;

            assert!(Utc::now() >= target);
            assert!(
                overshoot < Duration::from_millis(50),
                "overshoot too large: {:?}",
                overshoot
            );
        }
    }
}
