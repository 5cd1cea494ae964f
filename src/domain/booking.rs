use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{BookingId, ContactEmail, EventId, MobileNumber, PersonName};

/// Event reference embedded in a booking: either the raw id or the populated
/// event document.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum EventRef {
    Summary(EventSummary),
    Id(EventId),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct EventSummary {
    #[serde(default, alias = "_id")]
    pub id: Option<EventId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "coverImage")]
    pub img: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    #[serde(alias = "_id")]
    pub id: BookingId,
    #[serde(default)]
    pub event: Option<EventRef>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub mobile: String,
    pub quantity: u32,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub booking_date: Option<DateTime<Utc>>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    /// QR code image (data URL) presented at the venue.
    #[serde(default)]
    pub qr: Option<String>,
}

impl Booking {
    pub fn booked_at(&self) -> Option<DateTime<Utc>> {
        self.booking_date.or(self.created_at)
    }

    /// Title of the booked event, when the backend populated it.
    pub fn event_title(&self) -> Option<&str> {
        match &self.event {
            Some(EventRef::Summary(summary)) => summary.title.as_deref(),
            _ => None,
        }
    }
}

/// Checkout request submitted on behalf of the signed-in user.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewBooking {
    #[serde(rename = "eventId")]
    pub event_id: EventId,
    pub name: PersonName,
    pub email: ContactEmail,
    pub mobile: MobileNumber,
    pub quantity: u32,
}
