//! Normalization of the two response shapes the backend produces.
//!
//! Some endpoints answer with the bare payload, others wrap it as
//! `{ success, data, message }` (or `{ success, booking }`). Callers only ever
//! see the inner payload.

use serde_json::{Map, Value};

use crate::api::errors::{ApiError, ApiResult};

const SUCCESS: &str = "success";
const MESSAGE: &str = "message";
const DATA: &str = "data";

/// Unwraps an enveloped response, passing bare payloads through untouched.
pub fn normalize_envelope(value: Value) -> ApiResult<Value> {
    let Value::Object(mut object) = value else {
        return Ok(value);
    };

    let Some(success) = object.get(SUCCESS).and_then(Value::as_bool) else {
        return Ok(Value::Object(object));
    };

    let message = object
        .remove(MESSAGE)
        .and_then(|m| m.as_str().map(str::to_string))
        .unwrap_or_default();

    if !success {
        return Err(ApiError::Rejected(message));
    }

    object.remove(SUCCESS);

    if let Some(data) = object.remove(DATA) {
        return Ok(data);
    }

    if object.len() == 1 {
        if let Some((_, only)) = object.into_iter().next() {
            return Ok(only);
        }
        return Ok(Value::Null);
    }

    Ok(Value::Object(object))
}

/// Wraps a payload the way enveloping endpoints do. Used by tests.
pub fn envelope(data: Value) -> Value {
    let mut object = Map::new();
    object.insert(SUCCESS.to_string(), Value::Bool(true));
    object.insert(DATA.to_string(), data);
    Value::Object(object)
}
