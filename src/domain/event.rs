use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{EventDescription, EventId, EventTitle, ImageUrl, LocationName};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Event {
    #[serde(alias = "_id")]
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub date: DateTime<Utc>,
    pub price: f64,
    pub total_seats: u32,
    pub available_seats: u32,
    #[serde(default)]
    pub img: Option<String>,
}

impl Event {
    /// Events dated exactly `now` still count as upcoming.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.date >= now
    }

    pub fn tickets_sold(&self) -> u32 {
        self.total_seats.saturating_sub(self.available_seats)
    }

    /// Amount charged for `quantity` tickets.
    pub fn total_for(&self, quantity: u32) -> f64 {
        self.price * f64::from(quantity)
    }

    /// Applies a live seat-count update; returns whether it targeted this event.
    pub fn apply_seat_update(&mut self, update: &SeatUpdate) -> bool {
        if self.id != update.event_id {
            return false;
        }
        self.available_seats = update.available_seats;
        true
    }
}

/// Message pushed by the backend whenever seats of an event change.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatUpdate {
    #[serde(rename = "eventId")]
    pub event_id: EventId,
    pub available_seats: u32,
}

/// Payload for creating or replacing an event.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct EventPayload {
    pub title: EventTitle,
    pub description: EventDescription,
    pub location: LocationName,
    pub date: DateTime<Utc>,
    pub total_seats: u32,
    /// Mirrors `total_seats`: saving an event resets its availability.
    pub available_seats: u32,
    pub price: f64,
    pub img: ImageUrl,
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn concert() -> Event {
        Event {
            id: EventId::new("ev1").unwrap(),
            title: "Concert".to_string(),
            description: String::new(),
            location: "Pune".to_string(),
            date: Utc.with_ymd_and_hms(2026, 1, 1, 18, 0, 0).unwrap(),
            price: 500.0,
            total_seats: 10,
            available_seats: 3,
            img: None,
        }
    }

    #[test]
    fn deserializes_backend_document() {
        let json = r#"{
            "_id": "65f1",
            "title": "Jazz Night",
            "description": "Smooth",
            "location": "Mumbai",
            "date": "2026-03-01T19:30:00.000Z",
            "price": 750,
            "total_seats": 100,
            "available_seats": 42,
            "img": "https://cdn.example.com/jazz.png",
            "__v": 0
        }"#;

        let event: Event = serde_json::from_str(json).unwrap();

        assert_eq!(event.id.as_str(), "65f1");
        assert_eq!(event.price, 750.0);
        assert_eq!(event.tickets_sold(), 58);
    }

    #[test]
    fn total_multiplies_price() {
        assert_eq!(concert().total_for(2), 1000.0);
    }

    #[test]
    fn upcoming_includes_now() {
        let event = concert();
        assert!(event.is_upcoming(event.date));
        assert!(!event.is_upcoming(event.date + Duration::seconds(1)));
    }

    #[test]
    fn seat_update_only_touches_matching_event() {
        let mut event = concert();
        let other = SeatUpdate {
            event_id: EventId::new("ev2").unwrap(),
            available_seats: 0,
        };
        assert!(!event.apply_seat_update(&other));
        assert_eq!(event.available_seats, 3);

        let update: SeatUpdate =
            serde_json::from_str(r#"{"eventId":"ev1","available_seats":1}"#).unwrap();
        assert!(event.apply_seat_update(&update));
        assert_eq!(event.available_seats, 1);
    }
}
