//! [`ApiClient`]-backed implementation of the backend traits.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::api::client::ApiClient;
use crate::api::errors::ApiResult;
use crate::api::{
    AuthBackend, BookingReader, BookingWriter, EventQuery, EventReader, EventWriter,
    LocationReader, LocationWriter, UserReader,
};
use crate::domain::{
    booking::{Booking, NewBooking},
    event::{Event, EventPayload},
    location::{Location, NewLocation},
    types::{EventId, LocationId, UserId},
    user::{Credentials, LoginResponse, Registration, User},
};

/// Backend reached over HTTP with whatever token the wrapped client carries.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: ApiClient,
}

impl HttpBackend {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

/// Per-user bookings arrive as `{ success, bookings }`, which the envelope
/// already unwraps, but older deployments answer `{ bookings }` alone.
#[derive(Deserialize)]
#[serde(untagged)]
enum BookingList {
    Bare(Vec<Booking>),
    Named { bookings: Vec<Booking> },
}

impl From<BookingList> for Vec<Booking> {
    fn from(list: BookingList) -> Self {
        match list {
            BookingList::Bare(bookings) | BookingList::Named { bookings } => bookings,
        }
    }
}

#[async_trait]
impl EventReader for HttpBackend {
    async fn list_events(&self, query: &EventQuery) -> ApiResult<Vec<Event>> {
        self.client.get_with_query("/events", query).await
    }

    async fn get_event(&self, id: &EventId) -> ApiResult<Event> {
        self.client.get(&format!("/events/{id}")).await
    }
}

#[async_trait]
impl EventWriter for HttpBackend {
    async fn create_event(&self, payload: &EventPayload) -> ApiResult<Event> {
        self.client.post("/events", payload).await
    }

    async fn update_event(&self, id: &EventId, payload: &EventPayload) -> ApiResult<Event> {
        self.client.put(&format!("/events/{id}"), payload).await
    }

    async fn delete_event(&self, id: &EventId) -> ApiResult<()> {
        self.client.delete(&format!("/events/{id}")).await
    }
}

#[async_trait]
impl BookingReader for HttpBackend {
    async fn list_event_bookings(&self, event_id: &EventId) -> ApiResult<Vec<Booking>> {
        let list: BookingList = self
            .client
            .get(&format!("/bookings/event/{event_id}"))
            .await?;
        Ok(list.into())
    }

    async fn list_user_bookings(&self, user_id: &UserId) -> ApiResult<Vec<Booking>> {
        let list: BookingList = self
            .client
            .get(&format!("/admin/users/{user_id}/bookings"))
            .await?;
        Ok(list.into())
    }
}

#[async_trait]
impl BookingWriter for HttpBackend {
    async fn create_booking(&self, booking: &NewBooking) -> ApiResult<Booking> {
        self.client.post("/bookings", booking).await
    }
}

#[async_trait]
impl AuthBackend for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        self.client.post("/auth/login", credentials).await
    }

    async fn register(&self, registration: &Registration) -> ApiResult<()> {
        let _: Value = self.client.post("/auth/register", registration).await?;
        Ok(())
    }

    async fn admin_login(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        self.client.post("/admin/login", credentials).await
    }

    async fn verify_admin(&self) -> ApiResult<()> {
        let _: Value = self.client.get("/admin/verify").await?;
        Ok(())
    }
}

#[async_trait]
impl UserReader for HttpBackend {
    async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.client.get("/admin/users").await
    }
}

#[async_trait]
impl LocationReader for HttpBackend {
    async fn list_locations(&self) -> ApiResult<Vec<Location>> {
        self.client.get("/admin/locations").await
    }
}

#[async_trait]
impl LocationWriter for HttpBackend {
    async fn create_location(&self, location: &NewLocation) -> ApiResult<Location> {
        self.client.post("/admin/locations", location).await
    }

    async fn delete_location(&self, id: &LocationId) -> ApiResult<()> {
        self.client.delete(&format!("/admin/locations/{id}")).await
    }
}
