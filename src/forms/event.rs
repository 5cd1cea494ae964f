use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::event::{Event, EventPayload};
use crate::domain::types::{EventDescription, EventTitle, ImageUrl, LocationName};
use crate::forms::validation::{Rule, Schema, compose, min, number, required};
use crate::forms::{FormError, FormFields, field_map};

/// Selector entry that reveals the free-text location input.
pub const OTHER_LOCATION: &str = "Other";

/// Format produced by `<input type="datetime-local">`.
pub const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
/// Create/edit form on the admin Events tab.
pub struct EventForm {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1))]
    pub location: String,
    #[serde(default)]
    pub custom_location: String,
    #[validate(length(min = 1))]
    pub date: String,
    pub total_seats: String,
    pub price: String,
    #[validate(url)]
    pub img: String,
}

impl EventForm {
    /// Prefills the form for editing `event`. Locations missing from
    /// `known_locations` are shown through the "Other" input.
    pub fn from_event(event: &Event, known_locations: &[String]) -> Self {
        let known = known_locations.iter().any(|l| l == &event.location);
        let (location, custom_location) = if known {
            (event.location.clone(), String::new())
        } else {
            (OTHER_LOCATION.to_string(), event.location.clone())
        };

        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            location,
            custom_location,
            date: event.date.format(DATETIME_LOCAL_FORMAT).to_string(),
            total_seats: event.total_seats.to_string(),
            price: event.price.to_string(),
            img: event.img.clone().unwrap_or_default(),
        }
    }

    pub fn uses_custom_location(&self) -> bool {
        self.location == OTHER_LOCATION
    }

    /// Location actually saved with the event.
    pub fn final_location(&self) -> &str {
        if self.uses_custom_location() {
            self.custom_location.trim()
        } else {
            self.location.as_str()
        }
    }
}

/// Accepts `datetime-local` input as UTC, or a full RFC 3339 timestamp.
pub fn parse_event_date(value: &str) -> Result<DateTime<Utc>, FormError> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, DATETIME_LOCAL_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| FormError::InvalidDate)
}

impl FormFields for EventForm {
    fn schema(&self) -> Schema {
        let mut schema = Schema::from([
            ("title", Rule::new(required)),
            ("description", Rule::new(required)),
            ("location", Rule::new(required)),
            ("date", Rule::new(required)),
            (
                "total_seats",
                compose([Rule::new(required), Rule::new(number), min(1)]),
            ),
            (
                "price",
                compose([Rule::new(required), Rule::new(number), min(0)]),
            ),
            ("img", Rule::new(required)),
        ]);
        if self.uses_custom_location() {
            schema.insert(
                "custom_location",
                Rule::new(|value| {
                    value
                        .trim()
                        .is_empty()
                        .then(|| "Please enter a custom location".to_string())
                }),
            );
        }
        schema
    }

    fn values(&self) -> HashMap<String, String> {
        field_map([
            ("title", self.title.as_str()),
            ("description", self.description.as_str()),
            ("location", self.location.as_str()),
            ("custom_location", self.custom_location.as_str()),
            ("date", self.date.as_str()),
            ("total_seats", self.total_seats.as_str()),
            ("price", self.price.as_str()),
            ("img", self.img.as_str()),
        ])
    }
}

impl TryFrom<EventForm> for EventPayload {
    type Error = FormError;

    fn try_from(form: EventForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let total_seats = form
            .total_seats
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|seats| *seats >= 1)
            .ok_or_else(|| FormError::InvalidNumber("total_seats".to_string()))?;
        let price = form
            .price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite() && *price >= 0.0)
            .ok_or_else(|| FormError::InvalidNumber("price".to_string()))?;

        let location = LocationName::new(form.final_location())
            .map_err(|_| FormError::Invalid("Please enter a custom location".to_string()))?;

        Ok(EventPayload {
            title: EventTitle::new(form.title)?,
            description: EventDescription::new(form.description)?,
            location,
            date: parse_event_date(&form.date)?,
            total_seats,
            available_seats: total_seats,
            price,
            img: ImageUrl::new(form.img)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::types::EventId;

    fn form() -> EventForm {
        EventForm {
            title: "Jazz Night".to_string(),
            description: "Smooth".to_string(),
            location: "Pune".to_string(),
            custom_location: String::new(),
            date: "2026-03-01T19:30".to_string(),
            total_seats: "100".to_string(),
            price: "750".to_string(),
            img: "https://cdn.example.com/jazz.png".to_string(),
        }
    }

    #[test]
    fn payload_resets_availability() {
        let payload = EventPayload::try_from(form()).unwrap();
        assert_eq!(payload.total_seats, 100);
        assert_eq!(payload.available_seats, 100);
        assert_eq!(payload.price, 750.0);
        assert_eq!(
            payload.date,
            Utc.with_ymd_and_hms(2026, 3, 1, 19, 30, 0).unwrap()
        );
    }

    #[test]
    fn other_location_requires_custom_value() {
        let other = EventForm {
            location: OTHER_LOCATION.to_string(),
            ..form()
        };
        let mut state = other.state();
        assert!(!state.validate_all());
        assert_eq!(
            state.visible_error("custom_location"),
            Some("Please enter a custom location")
        );

        let filled = EventForm {
            custom_location: " Goa ".to_string(),
            ..other
        };
        assert_eq!(EventPayload::try_from(filled).unwrap().location.as_str(), "Goa");
    }

    #[test]
    fn seats_must_be_positive() {
        let zero = EventForm {
            total_seats: "0".to_string(),
            ..form()
        };
        let mut state = zero.state();
        assert!(!state.validate_all());
        assert_eq!(state.visible_error("total_seats"), Some("Must be at least 1"));
        assert!(matches!(
            EventPayload::try_from(zero),
            Err(FormError::InvalidNumber(_))
        ));
    }

    #[test]
    fn editing_unknown_location_uses_other() {
        let event = Event {
            id: EventId::new("ev1").unwrap(),
            title: "Jazz".to_string(),
            description: "Smooth".to_string(),
            location: "Goa".to_string(),
            date: Utc.with_ymd_and_hms(2026, 3, 1, 19, 30, 0).unwrap(),
            price: 750.0,
            total_seats: 100,
            available_seats: 10,
            img: Some("https://cdn.example.com/jazz.png".to_string()),
        };

        let edit = EventForm::from_event(&event, &["Pune".to_string()]);

        assert_eq!(edit.location, OTHER_LOCATION);
        assert_eq!(edit.custom_location, "Goa");
        assert_eq!(edit.date, "2026-03-01T19:30");
        assert_eq!(edit.price, "750");
    }
}
