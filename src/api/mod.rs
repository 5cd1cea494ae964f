//! Access to the Eventify REST backend.
//!
//! Services depend on the narrow reader/writer traits below rather than on the
//! HTTP client, so tests can substitute [`mock::MockBackend`].

use async_trait::async_trait;
use serde::Serialize;

use crate::api::errors::ApiResult;
use crate::domain::{
    booking::{Booking, NewBooking},
    event::{Event, EventPayload},
    location::{Location, NewLocation},
    types::{EventId, LocationId, UserId},
    user::{Credentials, LoginResponse, Registration, User},
};

pub mod client;
pub mod envelope;
pub mod errors;
#[cfg(any(test, feature = "test-mocks"))]
pub mod fixtures;
pub mod http;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

/// Filters accepted by `GET /events`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl EventQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Free-text search; blank input is ignored.
    pub fn search(mut self, q: impl Into<String>) -> Self {
        let q = q.into();
        let q = q.trim();
        self.q = (!q.is_empty()).then(|| q.to_string());
        self
    }

    /// Restrict to a location display name; blank input is ignored.
    pub fn location(mut self, location: impl Into<String>) -> Self {
        let location = location.into();
        let location = location.trim();
        self.location = (!location.is_empty()).then(|| location.to_string());
        self
    }
}

#[async_trait]
pub trait EventReader {
    async fn list_events(&self, query: &EventQuery) -> ApiResult<Vec<Event>>;
    async fn get_event(&self, id: &EventId) -> ApiResult<Event>;
}

#[async_trait]
pub trait EventWriter {
    async fn create_event(&self, payload: &EventPayload) -> ApiResult<Event>;
    async fn update_event(&self, id: &EventId, payload: &EventPayload) -> ApiResult<Event>;
    async fn delete_event(&self, id: &EventId) -> ApiResult<()>;
}

#[async_trait]
pub trait BookingReader {
    async fn list_event_bookings(&self, event_id: &EventId) -> ApiResult<Vec<Booking>>;
    async fn list_user_bookings(&self, user_id: &UserId) -> ApiResult<Vec<Booking>>;
}

#[async_trait]
pub trait BookingWriter {
    async fn create_booking(&self, booking: &NewBooking) -> ApiResult<Booking>;
}

#[async_trait]
pub trait AuthBackend {
    async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse>;
    async fn register(&self, registration: &Registration) -> ApiResult<()>;
    async fn admin_login(&self, credentials: &Credentials) -> ApiResult<LoginResponse>;
    /// Succeeds only while the attached admin token is still valid.
    async fn verify_admin(&self) -> ApiResult<()>;
}

#[async_trait]
pub trait UserReader {
    async fn list_users(&self) -> ApiResult<Vec<User>>;
}

#[async_trait]
pub trait LocationReader {
    async fn list_locations(&self) -> ApiResult<Vec<Location>>;
}

#[async_trait]
pub trait LocationWriter {
    async fn create_location(&self, location: &NewLocation) -> ApiResult<Location>;
    async fn delete_location(&self, id: &LocationId) -> ApiResult<()>;
}
