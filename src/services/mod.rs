//! Page-level workflows invoked by the route handlers.
//!
//! Services are generic over the backend traits in [`crate::api`] so they can
//! be exercised against [`crate::api::mock::MockBackend`].

use thiserror::Error;

use crate::api::errors::ApiError;
use crate::session::Role;

pub mod admin;
pub mod auth;
pub mod checkout;
pub mod countdown;
pub mod events;
pub mod roster;
pub mod scope;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Form(String),

    #[error("backend error: {0}")]
    Api(ApiError),

    #[error("type constraint violated: {0}")]
    TypeConstraint(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Message for a toast, preferring form and backend wording over `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ServiceError::Form(message) => message.clone(),
            ServiceError::Api(err) => err.user_message(fallback),
            _ => fallback.to_string(),
        }
    }

    /// Missing locally or reported missing by the backend.
    pub fn is_not_found(&self) -> bool {
        match self {
            ServiceError::NotFound => true,
            ServiceError::Api(err) => err.is_not_found(),
            _ => false,
        }
    }
}

/// Rejects sessions whose role differs from `required`.
pub fn ensure_role(role: Role, required: Role) -> ServiceResult<()> {
    match (role, required) {
        (actual, required) if actual == required => Ok(()),
        (Role::Anonymous, _) => Err(ServiceError::Unauthorized),
        _ => Err(ServiceError::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_guard() {
        assert!(ensure_role(Role::Admin, Role::Admin).is_ok());
        assert!(matches!(
            ensure_role(Role::Anonymous, Role::Admin),
            Err(ServiceError::Unauthorized)
        ));
        assert!(matches!(
            ensure_role(Role::User, Role::Admin),
            Err(ServiceError::Forbidden)
        ));
    }

    #[test]
    fn user_message_prefers_backend_text() {
        let err = ServiceError::Api(ApiError::Rejected("Sold out".to_string()));
        assert_eq!(err.user_message("Booking failed"), "Sold out");
        assert_eq!(ServiceError::NotFound.user_message("Booking failed"), "Booking failed");
    }
}
