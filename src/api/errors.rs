//! Error type surfaced by the backend client.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Request rejected: {0}")]
    Rejected(String),

    /// 404, with whatever message the backend attached.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Message suitable for a toast: the backend's own wording when it sent
    /// one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Backend { message, .. }
            | ApiError::Rejected(message)
            | ApiError::NotFound(message)
                if !message.is_empty() =>
            {
                message.clone()
            }
            _ => fallback.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    /// True for 401/403 responses, i.e. an expired or foreign session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Backend { status: 401 | 403, .. })
    }
}

/// Extracts a human-readable message from a structured error body.
///
/// Recognizes `{ "message": .. }`, `{ "error": .. }` and
/// `{ "errors": [..] }` (strings or objects carrying `msg`/`message`).
/// Anything else yields an empty string.
pub fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return String::new();
    };

    if let Some(message) = value.get("message").and_then(Value::as_str) {
        return message.trim().to_string();
    }
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        return error.trim().to_string();
    }
    if let Some(errors) = value.get("errors").and_then(Value::as_array) {
        return errors
            .iter()
            .filter_map(|item| {
                item.as_str()
                    .or_else(|| item.get("msg").and_then(Value::as_str))
                    .or_else(|| item.get("message").and_then(Value::as_str))
            })
            .collect::<Vec<_>>()
            .join(", ");
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_prefers_backend_wording() {
        let err = ApiError::Backend {
            status: 400,
            message: "Not enough seats".to_string(),
        };
        assert_eq!(err.user_message("Booking failed"), "Not enough seats");
        assert_eq!(
            ApiError::NotFound(String::new()).user_message("Booking failed"),
            "Booking failed"
        );
        assert_eq!(
            ApiError::NotFound("Event not found".to_string()).user_message("Booking failed"),
            "Event not found"
        );
    }

    #[test]
    fn empty_backend_message_falls_back() {
        let err = ApiError::Backend {
            status: 500,
            message: String::new(),
        };
        assert_eq!(err.user_message("Something went wrong"), "Something went wrong");
    }

    #[test]
    fn extracts_structured_messages() {
        assert_eq!(error_message(r#"{"message":"Invalid credentials"}"#), "Invalid credentials");
        assert_eq!(error_message(r#"{"error":"Token expired"}"#), "Token expired");
        assert_eq!(
            error_message(r#"{"errors":[{"msg":"Email taken"},"Weak password"]}"#),
            "Email taken, Weak password"
        );
        assert_eq!(error_message("<html>Bad Gateway</html>"), "");
    }

    #[test]
    fn detects_unauthorized() {
        let err = ApiError::Backend {
            status: 401,
            message: String::new(),
        };
        assert!(err.is_unauthorized());
        assert!(!ApiError::NotFound(String::new()).is_unauthorized());
    }
}
