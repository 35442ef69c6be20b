//! Booking race implementation.
//!
//! Drives one race from a time string to a booked ticket:
//! - Preload: fetch the departure list shortly before the target, tolerating failure
//! - Fire: at the exact target, book the cached departure (or fetch one now)
//! - Retry: on failure, refresh the departure and try again within the budget

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, error, info, warn};

use crate::booking::{BookingOutcome, FailureKind, TicketBooker};
use crate::locator::{DepartureLocator, Selection};
use crate::schedule::{resolve_target, Clock, PrecisionWaiter, SleepPolicy};
use crate::upstream::BusApi;

use super::config::{RaceConfig, MAX_PRELOAD_LEAD_SECS};
use super::types::{RaceError, RaceReport, RaceState};

/// Callback invoked with every state the race enters.
pub type TransitionObserver = Arc<dyn Fn(&RaceState) + Send + Sync>;

/// Runs a single booking race.
pub struct RaceOrchestrator {
    config: RaceConfig,
    timezone: Tz,
    preload_lead: chrono::TimeDelta,
    clock: Arc<dyn Clock>,
    waiter: PrecisionWaiter,
    locator: DepartureLocator,
    booker: TicketBooker,
    observer: Option<TransitionObserver>,
}

impl RaceOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        config: RaceConfig,
        api: Arc<dyn BusApi>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RaceError> {
        let timezone = config
            .tz()
            .ok_or_else(|| RaceError::Config(format!("unknown timezone {}", config.timezone)))?;
        if config.max_attempts == 0 {
            return Err(RaceError::Config("max_attempts cannot be 0".to_string()));
        }
        let preload_lead = config.preload_lead_delta().ok_or_else(|| {
            RaceError::Config(format!(
                "preload_lead_secs must be below {}, got {}",
                MAX_PRELOAD_LEAD_SECS, config.preload_lead_secs
            ))
        })?;

        let waiter = PrecisionWaiter::new(Arc::clone(&clock), config.progress_interval());
        let locator = DepartureLocator::new(
            Arc::clone(&api),
            config.route.clone(),
            config.selection_policy,
        );
        let booker = TicketBooker::new(api);

        Ok(Self {
            config,
            timezone,
            preload_lead,
            clock,
            waiter,
            locator,
            booker,
            observer: None,
        })
    }

    /// Set a callback for state transitions.
    pub fn with_observer(mut self, observer: TransitionObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Replace the waiter's sleep policy.
    pub fn with_sleep_policy(mut self, policy: SleepPolicy) -> Self {
        self.waiter = self.waiter.with_policy(policy);
        self
    }

    /// Run the race for a "HH:MM[:SS]" target to completion.
    pub async fn run(&self, input: &str) -> Result<RaceReport, RaceError> {
        let mut state = RaceState::Idle {
            input: input.to_string(),
        };

        loop {
            debug!(state = state.name(), "Race state");
            if let Some(observer) = &self.observer {
                observer(&state);
            }

            state = match state {
                RaceState::Done(result) => return result,
                other => self.step(other).await,
            };
        }
    }

    /// Perform the transition out of `state`. `Done` maps to itself.
    pub async fn step(&self, state: RaceState) -> RaceState {
        match state {
            RaceState::Idle { input } => self.resolve(&input),

            RaceState::TargetResolved { target } => {
                info!(
                    target = %target.format("%Y-%m-%d %H:%M:%S %Z"),
                    route = %self.config.route,
                    "Target time resolved"
                );
                RaceState::AwaitingPreload { target }
            }

            RaceState::AwaitingPreload { target } => {
                let cached = self.preload(target).await;
                RaceState::Preloaded { target, cached }
            }

            RaceState::Preloaded { target, cached } => RaceState::AwaitingTarget { target, cached },

            RaceState::AwaitingTarget { target, cached } => self.fire(target, cached).await,

            RaceState::Booking {
                target,
                selection,
                attempt,
                refreshes,
            } => self.attempt(target, selection, attempt, refreshes).await,

            done @ RaceState::Done(_) => done,
        }
    }

    fn resolve(&self, input: &str) -> RaceState {
        match resolve_target(input, self.clock.now(), self.timezone) {
            Ok(target) => RaceState::TargetResolved { target },
            Err(e) => {
                error!(input, error = %e, "Invalid target time");
                RaceState::Done(Err(e.into()))
            }
        }
    }

    /// Wait for the preload instant and fetch a departure, best effort.
    async fn preload(&self, target: DateTime<Tz>) -> Option<Selection> {
        let preload_at = target.with_timezone(&Utc) - self.preload_lead;
        self.waiter.wait_until(preload_at, "Preload").await;

        info!("Fetching departure");
        match self.locator.locate().await {
            Ok(Some(selection)) => Some(selection),
            Ok(None) => {
                info!("No bookable departure yet, will retry at target time");
                None
            }
            Err(e) => {
                warn!(error = %e, "Preload fetch failed, will retry at target time");
                None
            }
        }
    }

    /// Wait for the target and settle on the first selection to book.
    async fn fire(&self, target: DateTime<Tz>, cached: Option<Selection>) -> RaceState {
        let overshoot = self.waiter.wait_until(target.with_timezone(&Utc), "Booking").await;
        info!(overshoot_ms = overshoot.as_millis() as u64, "Booking");

        let selection = match cached {
            Some(selection) => selection,
            None => match self.locator.locate().await {
                Ok(Some(selection)) => selection,
                Ok(None) => {
                    error!(route = %self.config.route, "No bookable departure at target time");
                    return RaceState::Done(Err(RaceError::NoDeparture {
                        route: self.config.route.clone(),
                    }));
                }
                Err(e) => {
                    error!(error = %e, "Departure fetch failed at target time");
                    return RaceState::Done(Err(RaceError::DepartureUnavailable(e)));
                }
            },
        };

        RaceState::Booking {
            target,
            selection,
            attempt: 1,
            refreshes: 0,
        }
    }

    /// Make one booking attempt and decide what follows.
    async fn attempt(
        &self,
        target: DateTime<Tz>,
        selection: Selection,
        attempt: u32,
        refreshes: u32,
    ) -> RaceState {
        info!(
            attempt,
            max_attempts = self.config.max_attempts,
            departure_id = selection.departure_id,
            direction = %selection.direction,
            "Booking attempt"
        );

        let outcome = self.booker.book(&selection).await;
        if outcome.is_booked() {
            info!(
                departure_id = selection.departure_id,
                attempt, "Ticket booked"
            );
            return RaceState::Done(Ok(RaceReport {
                target,
                selection,
                attempts: attempt,
                refreshes,
                booked_at: self.clock.now(),
            }));
        }

        let kind = outcome.failure_kind().unwrap_or(FailureKind::UpstreamOutage);
        if attempt >= self.config.max_attempts {
            error!(attempts = attempt, kind = %kind, last = %outcome, "Booking attempts exhausted");
            return RaceState::Done(Err(RaceError::Exhausted {
                attempts: attempt,
                kind,
                last: outcome,
            }));
        }

        if kind == FailureKind::Credential {
            warn!(last = %outcome, "Booking rejected the session token, retrying anyway");
        }

        let selection = self.refresh(selection, &outcome).await;
        self.clock.sleep(self.config.retry_backoff()).await;

        RaceState::Booking {
            target,
            selection,
            attempt: attempt + 1,
            refreshes: refreshes + 1,
        }
    }

    /// Re-fetch departures after a failed attempt, keeping `previous` when
    /// nothing better comes back.
    async fn refresh(&self, previous: Selection, outcome: &BookingOutcome) -> Selection {
        debug!(last = %outcome, "Refreshing departure before retry");
        match self.locator.locate().await {
            Ok(Some(fresh)) => {
                if fresh != previous {
                    info!(
                        from = previous.departure_id,
                        to = fresh.departure_id,
                        direction = %fresh.direction,
                        "Switching departure"
                    );
                }
                fresh
            }
            Ok(None) => {
                warn!("Refresh found no bookable departure, keeping previous");
                previous
            }
            Err(e) => {
                warn!(error = %e, "Refresh failed, keeping previous departure");
                previous
            }
        }
    }
}
