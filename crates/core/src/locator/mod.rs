//! Departure locator.
//!
//! Fetches the current departure list and picks the one to book. The choice
//! itself is a pure function of the list ([`select_departure`]) so it can be
//! reasoned about without a network.

mod policy;

pub use policy::{select_departure, Direction, Selection, SelectionPolicy};

use std::sync::Arc;

use tracing::{debug, info};

use crate::upstream::{BusApi, UpstreamError};

/// Finds the departure to book on a given route.
pub struct DepartureLocator {
    api: Arc<dyn BusApi>,
    route: String,
    policy: SelectionPolicy,
}

impl DepartureLocator {
    pub fn new(api: Arc<dyn BusApi>, route: impl Into<String>, policy: SelectionPolicy) -> Self {
        Self {
            api,
            route: route.into(),
            policy,
        }
    }

    /// Fetch the departure list once and select from it.
    ///
    /// `Ok(None)` means the fetch worked but nothing is bookable right now,
    /// which is normal before seats open.
    pub async fn locate(&self) -> Result<Option<Selection>, UpstreamError> {
        let departures = self.api.current_departures().await?;
        debug!(
            api = self.api.name(),
            count = departures.len(),
            route = %self.route,
            "Selecting departure"
        );

        let selection = select_departure(&departures, &self.route, self.policy);
        match &selection {
            Some(sel) => info!(
                departure_id = sel.departure_id,
                direction = %sel.direction,
                "Departure located"
            ),
            None => debug!(route = %self.route, "No bookable departure"),
        }
        Ok(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockBusApi};

    #[tokio::test]
    async fn test_locate_selects_matching_departure() {
        let api = Arc::new(MockBusApi::new());
        api.set_departures(vec![
            fixtures::departure(3, "Tetouan", 5, 5),
            fixtures::departure(4, "Martil", 0, 2),
        ])
        .await;

        let locator = DepartureLocator::new(api.clone(), "Martil", SelectionPolicy::HomeFirst);
        let selection = locator.locate().await.unwrap().unwrap();

        assert_eq!(selection.departure_id, 4);
        assert_eq!(selection.direction, Direction::ToCampus);
        assert_eq!(api.departure_calls().await, 1);
    }

    #[tokio::test]
    async fn test_locate_empty_list_is_not_found() {
        let api = Arc::new(MockBusApi::new());
        let locator = DepartureLocator::new(api, "Martil", SelectionPolicy::HomeFirst);

        assert_eq!(locator.locate().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_locate_propagates_upstream_error() {
        let api = Arc::new(MockBusApi::new());
        api.push_departures(Err(UpstreamError::Protocol("html".to_string())))
            .await;
        let locator = DepartureLocator::new(api, "Martil", SelectionPolicy::HomeFirst);

        let err = locator.locate().await.unwrap_err();
        assert!(matches!(err, UpstreamError::Protocol(_)));
    }
}
