//! DTOs used by the admin dashboard.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::booking::Booking;
use crate::domain::event::Event;
use crate::domain::location::Location;
use crate::domain::types::{EventId, LocationId};
use crate::domain::user::User;
use crate::forms::event::EventForm;
use crate::forms::location::LocationForm;
use crate::session::AdminTab;

/// Destructive action waiting for the operator's confirmation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PendingDeletion<Id> {
    pub id: Id,
    /// Human-readable name shown in the confirmation dialog.
    pub label: String,
}

/// A form that failed validation, kept so it can be shown again.
#[derive(Clone, Debug, Serialize)]
pub struct Draft<F> {
    pub form: F,
    pub errors: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct PastEventRow {
    pub event: Event,
    pub bookings_count: usize,
    pub expanded: bool,
    /// Loaded roster, present only for the expanded row.
    pub bookings: Option<Vec<Booking>>,
}

#[derive(Debug, Serialize)]
pub struct UserRow {
    pub user: User,
    /// Mobile number or `--` when the account has none.
    pub mobile: String,
}

#[derive(Debug, Serialize)]
pub struct UserBookings {
    pub user: User,
    pub bookings: Vec<Booking>,
}

/// Everything the dashboard template renders for the active tab.
#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub tab: AdminTab,
    pub upcoming: Vec<Event>,
    pub past: Vec<PastEventRow>,
    pub location_options: Vec<String>,
    pub event_form: Draft<EventForm>,
    /// Id of the event being edited, if any.
    pub editing: Option<EventId>,
    pub pending_event_delete: Option<PendingDeletion<EventId>>,
    pub locations: Vec<Location>,
    pub location_form: Draft<LocationForm>,
    pub pending_location_delete: Option<PendingDeletion<LocationId>>,
    pub users: Vec<UserRow>,
    pub user_bookings: Option<UserBookings>,
}
