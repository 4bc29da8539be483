//! Projection of raw search hits into sparse summary records.

use serde_json::Value;

use crate::contract::{Document, Hit};

/// Whether a projected value carries information worth returning.
///
/// `null`, `""`, `[]` and `{}` all count as empty.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Only the non-empty entries of a hit's projected fields.
///
/// Absent or empty fields are omitted rather than defaulted.
pub fn present_fields(hit: &Hit) -> Document {
    hit.fields
        .iter()
        .filter(|(_, value)| is_present(value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
