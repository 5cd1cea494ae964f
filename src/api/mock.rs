//! Mock backend for isolating services in tests.

use async_trait::async_trait;
use mockall::mock;

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

mock! {
    pub Backend {}

    #[async_trait]
    impl EventReader for Backend {
        async fn list_events(&self, query: &EventQuery) -> ApiResult<Vec<Event>>;
        async fn get_event(&self, id: &EventId) -> ApiResult<Event>;
    }

    #[async_trait]
    impl EventWriter for Backend {
        async fn create_event(&self, payload: &EventPayload) -> ApiResult<Event>;
        async fn update_event(&self, id: &EventId, payload: &EventPayload) -> ApiResult<Event>;
        async fn delete_event(&self, id: &EventId) -> ApiResult<()>;
    }

    #[async_trait]
    impl BookingReader for Backend {
        async fn list_event_bookings(&self, event_id: &EventId) -> ApiResult<Vec<Booking>>;
        async fn list_user_bookings(&self, user_id: &UserId) -> ApiResult<Vec<Booking>>;
    }

    #[async_trait]
    impl BookingWriter for Backend {
        async fn create_booking(&self, booking: &NewBooking) -> ApiResult<Booking>;
    }

    #[async_trait]
    impl AuthBackend for Backend {
        async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse>;
        async fn register(&self, registration: &Registration) -> ApiResult<()>;
        async fn admin_login(&self, credentials: &Credentials) -> ApiResult<LoginResponse>;
        async fn verify_admin(&self) -> ApiResult<()>;
    }

    #[async_trait]
    impl UserReader for Backend {
        async fn list_users(&self) -> ApiResult<Vec<User>>;
    }

    #[async_trait]
    impl LocationReader for Backend {
        async fn list_locations(&self) -> ApiResult<Vec<Location>>;
    }

    #[async_trait]
    impl LocationWriter for Backend {
        async fn create_location(&self, location: &NewLocation) -> ApiResult<Location>;
        async fn delete_location(&self, id: &LocationId) -> ApiResult<()>;
    }
}
