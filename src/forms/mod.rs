//! Form definitions backing the Eventify routes.

use std::collections::HashMap;

use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;
use crate::forms::state::FormState;
use crate::forms::validation::Schema;

pub mod auth;
pub mod checkout;
pub mod event;
pub mod location;
pub mod state;
pub mod validation;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid name")]
    InvalidName,

    #[error("invalid mobile number")]
    InvalidMobile,

    #[error("invalid url")]
    InvalidUrl,

    #[error("invalid date")]
    InvalidDate,

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("{0}")]
    Invalid(String),
}

impl From<TypeConstraintError> for FormError {
    fn from(err: TypeConstraintError) -> Self {
        match err {
            TypeConstraintError::InvalidEmail => FormError::InvalidEmail,
            TypeConstraintError::InvalidMobile => FormError::InvalidMobile,
            TypeConstraintError::InvalidUrl => FormError::InvalidUrl,
            other => FormError::Invalid(other.to_string()),
        }
    }
}

/// A submitted form paired with the rules its fields must satisfy.
pub trait FormFields {
    /// Rules keyed by field name. May depend on the submitted values.
    fn schema(&self) -> Schema;

    /// Raw field values as submitted.
    fn values(&self) -> HashMap<String, String>;

    /// Editing state seeded with the submitted values.
    fn state(&self) -> FormState {
        let mut state = FormState::new(self.schema(), HashMap::new());
        state.set_values(self.values());
        state
    }
}

pub(crate) fn field_map<const N: usize>(pairs: [(&str, &str); N]) -> HashMap<String, String> {
    pairs
        .into_iter()
        .map(|(field, value)| (field.to_string(), value.to_string()))
        .collect()
}
