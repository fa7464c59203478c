//! Command surface: authenticated entry points over `CoreState`.
//!
//! Handlers return `Result<T, String>`; `envelope` renders either side in
//! the wire shape `{"success": true, ...}` / `{"error": "..."}`.

pub mod cohort;
pub mod projects;

use serde::Serialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

/// Health check: verifies the backend is reachable.
pub fn health_check() -> String {
    tracing::debug!("Health check called");
    "ok".to_string()
}

/// Render a handler result as `{success: true, ..fields}` or `{error}`.
pub fn envelope<T: Serialize>(result: Result<T, String>) -> Value {
    match result {
        Ok(data) => {
            let mut body = match serde_json::to_value(data) {
                Ok(Value::Object(map)) => map,
                Ok(Value::Null) => Map::new(),
                Ok(other) => Map::from_iter([("data".to_string(), other)]),
                Err(e) => return json!({ "error": e.to_string() }),
            };
            body.insert("success".into(), Value::Bool(true));
            Value::Object(body)
        }
        Err(error) => json!({ "error": error }),
    }
}

pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|e| format!("Invalid {what} ID: {e}"))
}
