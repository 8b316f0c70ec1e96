//! Shared validation helpers for inbound HTTP handlers.

use serde_json::json;

use crate::domain::Error;

/// Error for a required body field that was absent or null.
pub(crate) fn missing_field_error(field: &str) -> Error {
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": "missing_field",
    }))
}
