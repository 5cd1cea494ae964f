//! Public event listing and details.

use chrono::{DateTime, Utc};

use crate::api::{EventQuery, EventReader, LocationReader};
use crate::domain::event::{Event, SeatUpdate};
use crate::domain::types::EventId;
use crate::dto::events::{EventDetailsData, EventsPageData, QuantitySelection};
use crate::services::{ServiceError, ServiceResult};

/// Clamps `requested` to `[1, available_seats]`, explaining any adjustment.
pub fn select_quantity(requested: i64, available_seats: u32) -> QuantitySelection {
    if requested < 1 {
        return QuantitySelection {
            quantity: 1,
            error: Some("Quantity must be at least 1".to_string()),
        };
    }
    if requested > i64::from(available_seats) {
        return QuantitySelection {
            quantity: available_seats,
            error: Some(format!("Only {available_seats} seats available")),
        };
    }
    QuantitySelection {
        quantity: requested as u32,
        error: None,
    }
}

impl QuantitySelection {
    /// Whether the selection may proceed to checkout.
    pub fn is_bookable(&self, available_seats: u32) -> bool {
        self.quantity >= 1 && self.quantity <= available_seats
    }
}

/// Splits events into upcoming (`date >= now`) and past, keeping order.
pub fn partition_events(events: Vec<Event>, now: DateTime<Utc>) -> (Vec<Event>, Vec<Event>) {
    events.into_iter().partition(|event| event.is_upcoming(now))
}

/// Applies a live seat-count update to whichever listed event it targets.
pub fn apply_seat_update(events: &mut [Event], update: &SeatUpdate) -> bool {
    events
        .iter_mut()
        .any(|event| event.apply_seat_update(update))
}

/// Location display names for selectors. Failure is not fatal: the selector
/// simply shows no options.
pub async fn location_names<R>(repo: &R) -> Vec<String>
where
    R: LocationReader + ?Sized,
{
    match repo.list_locations().await {
        Ok(locations) => locations
            .into_iter()
            .map(|location| location.display_name)
            .collect(),
        Err(e) => {
            log::warn!("Failed to fetch locations: {e}");
            Vec::new()
        }
    }
}

/// Loads the listing filtered by `query`.
pub async fn load_events<R>(repo: &R, query: EventQuery) -> ServiceResult<EventsPageData>
where
    R: EventReader + LocationReader + ?Sized,
{
    let events = repo.list_events(&query).await.map_err(ServiceError::Api)?;
    let locations = location_names(repo).await;

    Ok(EventsPageData {
        events,
        locations,
        query,
    })
}

/// Loads one event with the default quantity selection.
pub async fn load_event_details<R>(
    repo: &R,
    event_id: &str,
    requested: Option<i64>,
) -> ServiceResult<EventDetailsData>
where
    R: EventReader + ?Sized,
{
    let event_id = EventId::new(event_id).map_err(|_| ServiceError::NotFound)?;
    let event = repo.get_event(&event_id).await?;
    let selection = select_quantity(requested.unwrap_or(1), event.available_seats);
    let total = event.total_for(selection.quantity);

    Ok(EventDetailsData {
        event,
        selection,
        total,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::api::errors::ApiError;
    use crate::api::fixtures;
    use crate::api::mock::MockBackend;

    #[test]
    fn quantity_is_clamped() {
        assert_eq!(
            select_quantity(0, 3),
            QuantitySelection {
                quantity: 1,
                error: Some("Quantity must be at least 1".to_string())
            }
        );
        assert_eq!(select_quantity(-4, 3).quantity, 1);
        assert_eq!(
            select_quantity(5, 3),
            QuantitySelection {
                quantity: 3,
                error: Some("Only 3 seats available".to_string())
            }
        );
        assert_eq!(select_quantity(2, 3).error, None);
    }

    #[test]
    fn sold_out_selection_is_not_bookable() {
        let selection = select_quantity(1, 0);
        assert_eq!(selection.quantity, 0);
        assert!(!selection.is_bookable(0));
        assert!(select_quantity(2, 3).is_bookable(3));
    }

    #[test]
    fn partition_uses_now_as_boundary() {
        let now = Utc::now();
        let events = vec![
            fixtures::event("past", now - Duration::days(1)),
            fixtures::event("now", now),
            fixtures::event("soon", now + Duration::days(1)),
        ];

        let (upcoming, past) = partition_events(events, now);

        let ids = |events: &[Event]| events.iter().map(|e| e.id.to_string()).collect::<Vec<_>>();
        assert_eq!(ids(&upcoming), vec!["now", "soon"]);
        assert_eq!(ids(&past), vec!["past"]);
    }

    #[test]
    fn seat_update_patches_listing() {
        let now = Utc::now();
        let mut events = vec![fixtures::event("a", now), fixtures::event("b", now)];
        let update = SeatUpdate {
            event_id: EventId::new("b").unwrap(),
            available_seats: 0,
        };

        assert!(apply_seat_update(&mut events, &update));
        assert_eq!(events[0].available_seats, 3);
        assert_eq!(events[1].available_seats, 0);
    }

    #[actix_web::test]
    async fn listing_passes_filters_and_tolerates_location_failure() {
        let mut backend = MockBackend::new();
        let now = Utc::now();
        backend
            .expect_list_events()
            .withf(|query| query.q.as_deref() == Some("jazz") && query.location.is_none())
            .times(1)
            .returning(move |_| Ok(vec![fixtures::event("a", now)]));
        backend
            .expect_list_locations()
            .times(1)
            .returning(|| Err(ApiError::NotFound(String::new())));

        let data = load_events(&backend, EventQuery::new().search("jazz"))
            .await
            .unwrap();

        assert_eq!(data.events.len(), 1);
        assert!(data.locations.is_empty());
    }

    #[actix_web::test]
    async fn details_start_with_one_ticket() {
        let mut backend = MockBackend::new();
        let now = Utc::now();
        backend
            .expect_get_event()
            .withf(|id| id.as_str() == "a")
            .times(1)
            .returning(move |_| Ok(fixtures::event("a", now)));

        let data = load_event_details(&backend, "a", None).await.unwrap();

        assert_eq!(data.selection.quantity, 1);
        assert_eq!(data.total, 500.0);
    }

    #[actix_web::test]
    async fn blank_id_is_not_found_without_fetch() {
        let mut backend = MockBackend::new();
        backend.expect_get_event().times(0);

        let result = load_event_details(&backend, " ", None).await;

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }
}
