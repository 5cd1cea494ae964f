//! DTOs used by the public event pages.

use serde::Serialize;

use crate::api::EventQuery;
use crate::domain::event::Event;

/// Data required to render the events listing.
#[derive(Debug, Serialize)]
pub struct EventsPageData {
    pub events: Vec<Event>,
    /// Location display names offered in the filter selector.
    pub locations: Vec<String>,
    /// Filters echoed back into the search form.
    pub query: EventQuery,
}

/// Outcome of clamping a requested ticket quantity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuantitySelection {
    pub quantity: u32,
    /// Inline message when the request had to be adjusted.
    pub error: Option<String>,
}

/// Data required to render the event details page.
#[derive(Debug, Serialize)]
pub struct EventDetailsData {
    pub event: Event,
    pub selection: QuantitySelection,
    pub total: f64,
}
