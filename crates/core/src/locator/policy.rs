//! Departure selection policies.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::upstream::Departure;

/// Which way the ticket is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    ToHome,
    ToCampus,
}

impl Direction {
    /// The `to_campus` flag the booking endpoint expects.
    pub fn to_campus(self) -> bool {
        matches!(self, Direction::ToCampus)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::ToHome => "to_home",
            Direction::ToCampus => "to_campus",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A departure and direction chosen for booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub departure_id: i64,
    pub direction: Direction,
}

/// How to choose among eligible departures.
///
/// A departure is eligible when it is on the configured route, not locked,
/// and has a free seat in some direction. A departure without any seat
/// counters counts as having seats toward home.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// First eligible departure in list order. Toward home is preferred
    /// over toward campus within that departure.
    #[default]
    HomeFirst,
    /// Eligible departure with the highest id, direction as for `HomeFirst`.
    NewestFirst,
}

/// Pick the departure to book, if any.
pub fn select_departure(
    departures: &[Departure],
    route: &str,
    policy: SelectionPolicy,
) -> Option<Selection> {
    let mut eligible = departures
        .iter()
        .filter(|d| !d.locked && d.route.name == route)
        .filter_map(|d| {
            bookable_direction(d).map(|direction| Selection {
                departure_id: d.id,
                direction,
            })
        });

    match policy {
        SelectionPolicy::HomeFirst => eligible.next(),
        // max_by_key keeps the last maximum; ids are unique upstream anyway
        SelectionPolicy::NewestFirst => eligible.max_by_key(|s| s.departure_id),
    }
}

fn bookable_direction(departure: &Departure) -> Option<Direction> {
    if !departure.has_seat_counters() {
        return Some(Direction::ToHome);
    }
    if departure.nbr_to_home.unwrap_or(0) > 0 {
        Some(Direction::ToHome)
    } else if departure.nbr_to_campus.unwrap_or(0) > 0 {
        Some(Direction::ToCampus)
    } else {
        None
    }
}
