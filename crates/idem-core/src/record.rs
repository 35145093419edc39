//! Field-map interchange format and decoding helpers
//!
//! Elements cross the persistence boundary as flat field maps. Decoding is
//! take-based: each recognized field is removed from the map as it is read,
//! and [`finish`] rejects whatever is left over, so every concrete type gets
//! the closed-field-set policy without bookkeeping a recognized-key set.
//!
//! Timestamps travel as RFC 3339 strings. `null` values are treated the same
//! as absent keys throughout.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::ElementError;

/// The field map an element is stored as.
pub type Record = serde_json::Map<String, Value>;

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn parse_datetime(field: &'static str, raw: &str) -> Result<DateTime<Utc>, ElementError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| ElementError::InvalidValue {
            field,
            reason: format!("not an RFC 3339 timestamp: {err}"),
        })
}

/// Remove and return a required string field.
///
/// # Errors
///
/// `MissingField` if the key is absent or `null`, `InvalidValue` if it holds
/// anything but a string.
pub fn take_string(
    record: &mut Record,
    element: &'static str,
    field: &'static str,
) -> Result<String, ElementError> {
    match record.remove(field) {
        None | Some(Value::Null) => Err(ElementError::MissingField { element, field }),
        Some(Value::String(value)) => Ok(value),
        Some(other) => Err(ElementError::InvalidValue {
            field,
            reason: format!("expected a string, got {}", value_kind(&other)),
        }),
    }
}

/// Remove and return an optional string field; absent or `null` is `None`.
///
/// # Errors
///
/// `InvalidValue` if the key holds anything but a string.
pub fn take_opt_string(
    record: &mut Record,
    field: &'static str,
) -> Result<Option<String>, ElementError> {
    match record.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(other) => Err(ElementError::InvalidValue {
            field,
            reason: format!("expected a string, got {}", value_kind(&other)),
        }),
    }
}

/// Remove and return a string field, substituting a default when absent.
///
/// # Errors
///
/// `InvalidValue` if the key holds anything but a string.
pub fn take_string_or(
    record: &mut Record,
    field: &'static str,
    default: &str,
) -> Result<String, ElementError> {
    Ok(take_opt_string(record, field)?.unwrap_or_else(|| default.to_owned()))
}

/// Remove and return a boolean field, substituting a default when absent.
///
/// # Errors
///
/// `InvalidValue` if the key holds anything but a boolean.
pub fn take_bool_or(
    record: &mut Record,
    field: &'static str,
    default: bool,
) -> Result<bool, ElementError> {
    match record.remove(field) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(value)) => Ok(value),
        Some(other) => Err(ElementError::InvalidValue {
            field,
            reason: format!("expected a boolean, got {}", value_kind(&other)),
        }),
    }
}

/// Remove and return a required RFC 3339 timestamp field.
///
/// # Errors
///
/// `MissingField` if the key is absent or `null`, `InvalidValue` if it does
/// not parse.
pub fn take_datetime(
    record: &mut Record,
    element: &'static str,
    field: &'static str,
) -> Result<DateTime<Utc>, ElementError> {
    match record.remove(field) {
        None | Some(Value::Null) => Err(ElementError::MissingField { element, field }),
        Some(Value::String(raw)) => parse_datetime(field, &raw),
        Some(other) => Err(ElementError::InvalidValue {
            field,
            reason: format!("expected a timestamp string, got {}", value_kind(&other)),
        }),
    }
}

/// Remove and return an optional RFC 3339 timestamp field.
///
/// # Errors
///
/// `InvalidValue` if the key holds anything but a parsable timestamp string.
pub fn take_opt_datetime(
    record: &mut Record,
    field: &'static str,
) -> Result<Option<DateTime<Utc>>, ElementError> {
    match record.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => parse_datetime(field, &raw).map(Some),
        Some(other) => Err(ElementError::InvalidValue {
            field,
            reason: format!("expected a timestamp string, got {}", value_kind(&other)),
        }),
    }
}

/// Reject any keys still present after all recognized fields were taken.
///
/// # Errors
///
/// `UnknownFields` listing the leftover keys in sorted order.
pub fn finish(record: &Record, element: &'static str) -> Result<(), ElementError> {
    if record.is_empty() {
        return Ok(());
    }
    Err(ElementError::UnknownFields {
        element,
        fields: record.keys().cloned().collect(),
    })
}

/// Insert a string field when a value is present; `None` writes nothing.
pub fn put_opt_string(record: &mut Record, field: &str, value: Option<&str>) {
    if let Some(value) = value {
        record.insert(field.to_owned(), Value::String(value.to_owned()));
    }
}

/// Insert an RFC 3339 timestamp field.
pub fn put_datetime(record: &mut Record, field: &str, ts: DateTime<Utc>) {
    record.insert(field.to_owned(), Value::String(ts.to_rfc3339()));
}

/// Insert an RFC 3339 timestamp field when present; `None` writes nothing.
pub fn put_opt_datetime(record: &mut Record, field: &str, ts: Option<DateTime<Utc>>) {
    if let Some(ts) = ts {
        put_datetime(record, field, ts);
    }
}
