//! Error conversion glue between layers.
//!
//! The domain, api and forms layers know nothing about services; the
//! conversions into [`ServiceError`] live here so `?` works in services.

use crate::api::errors::ApiError;
use crate::domain::types::TypeConstraintError;
use crate::forms::FormError;
use crate::services::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<ApiError> for ServiceError {
    fn from(val: ApiError) -> Self {
        match val {
            err if err.is_unauthorized() => ServiceError::Unauthorized,
            err => ServiceError::Api(err),
        }
    }
}

impl From<FormError> for ServiceError {
    fn from(val: FormError) -> Self {
        match val {
            FormError::Validation(_) => {
                ServiceError::Form("Please fix the highlighted fields".to_string())
            }
            FormError::InvalidEmail => {
                ServiceError::Form("Please enter a valid email address".to_string())
            }
            FormError::InvalidMobile => {
                ServiceError::Form("Please enter a valid 10-digit mobile number".to_string())
            }
            other => ServiceError::Form(other.to_string()),
        }
    }
}
