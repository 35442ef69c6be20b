//! Target instant resolution.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Errors that can occur while resolving a target time.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("invalid time format {0:?}, expected HH:MM or HH:MM:SS")]
    InvalidFormat(String),

    #[error("local time {0} does not exist in {1}")]
    Unrepresentable(String, String),
}

/// Parse a 24-hour "HH:MM" or "HH:MM:SS" string.
pub fn parse_time_of_day(input: &str) -> Result<NaiveTime, TargetError> {
    let invalid = || TargetError::InvalidFormat(input.to_string());

    let parts: Vec<&str> = input.split(':').collect();
    if !(2..=3).contains(&parts.len())
        || parts
            .iter()
            .any(|p| p.is_empty() || p.len() > 2 || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(invalid());
    }

    let time = match parts.len() {
        2 => NaiveTime::parse_from_str(input, "%H:%M"),
        _ => NaiveTime::parse_from_str(input, "%H:%M:%S"),
    }
    .map_err(|_| invalid())?;

    // chrono accepts ":60" as a leap second
    if time.nanosecond() >= 1_000_000_000 {
        return Err(invalid());
    }

    Ok(time)
}

/// Resolve `input` to the earliest instant with that time of day in `tz`
/// that is strictly after `now`.
///
/// Only a single day of rollover is applied: a time that already passed today
/// lands on tomorrow.
pub fn resolve_target(input: &str, now: DateTime<Utc>, tz: Tz) -> Result<DateTime<Tz>, TargetError> {
    let time = parse_time_of_day(input)?;
    let today = now.with_timezone(&tz).date_naive();

    if let Some(candidate) = localize(tz, today.and_time(time))?
        .into_iter()
        .find(|dt| dt.with_timezone(&Utc) > now)
    {
        return Ok(candidate);
    }

    let tomorrow = today + Duration::days(1);
    localize(tz, tomorrow.and_time(time))?
        .into_iter()
        .next()
        .ok_or_else(|| TargetError::Unrepresentable(tomorrow.and_time(time).to_string(), tz.name().to_string()))
}

/// Pin a naive local time to the zone, earliest instant first.
///
/// Ambiguous times (clocks falling back) yield both instants; times inside a
/// spring-forward gap move one hour later.
fn localize(tz: Tz, naive: NaiveDateTime) -> Result<Vec<DateTime<Tz>>, TargetError> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(vec![dt]),
        LocalResult::Ambiguous(earliest, latest) => Ok(vec![earliest, latest]),
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|dt| vec![dt])
            .ok_or_else(|| TargetError::Unrepresentable(naive.to_string(), tz.name().to_string())),
    }
}
