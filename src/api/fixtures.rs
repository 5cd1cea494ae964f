//! Sample backend documents for tests.

use chrono::{DateTime, Utc};

use crate::domain::booking::{Booking, EventRef};
use crate::domain::event::Event;
use crate::domain::location::Location;
use crate::domain::types::{BookingId, EventId, LocationId, UserId};
use crate::domain::user::User;

pub fn event(id: &str, date: DateTime<Utc>) -> Event {
    Event {
        id: EventId::new(id).expect("fixture id"),
        title: format!("Event {id}"),
        description: "An evening of music".to_string(),
        location: "Pune".to_string(),
        date,
        price: 500.0,
        total_seats: 10,
        available_seats: 3,
        img: Some("https://cdn.example.com/event.png".to_string()),
    }
}

pub fn booking(id: &str, event_id: &str, quantity: u32) -> Booking {
    Booking {
        id: BookingId::new(id).expect("fixture id"),
        event: Some(EventRef::Id(EventId::new(event_id).expect("fixture id"))),
        name: "Asha Rao".to_string(),
        email: "asha@example.com".to_string(),
        mobile: "9876543210".to_string(),
        quantity,
        total_amount: 500.0 * f64::from(quantity),
        booking_date: None,
        created_at: None,
        qr: Some("data:image/png;base64,AAAA".to_string()),
    }
}

pub fn location(id: &str, display_name: &str) -> Location {
    Location {
        id: LocationId::new(id).expect("fixture id"),
        name: display_name.to_lowercase().replace(' ', "-"),
        display_name: display_name.to_string(),
    }
}

pub fn user(id: &str, mobile: Option<&str>) -> User {
    User {
        id: UserId::new(id).expect("fixture id"),
        name: format!("User {id}"),
        email: format!("{id}@example.com"),
        role: Some("user".to_string()),
        mobile: mobile.map(str::to_string),
    }
}
