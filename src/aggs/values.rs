//! Field extraction helpers over generic JSON values
//!
//! Numeric fields follow engine defaulting: an absent or `null` field reads as
//! zero. A present field of the wrong shape is a type mismatch. Numbers sent
//! as strings (`"42"`, `"NaN"`) are parsed.

use serde_json::{Map, Value};

use super::errors::{DecodeError, DecodeResult};

/// A decoded JSON object
pub type JsonObject = Map<String, Value>;

/// Returns the JSON type name for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Creates a field path from prefix and field name.
pub(crate) fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

/// Creates an element path for an array position.
pub(crate) fn index_path(prefix: &str, index: usize) -> String {
    format!("{}[{}]", prefix, index)
}

/// Requires `value` to be an object.
pub(crate) fn expect_object<'a>(value: &'a Value, path: &str) -> DecodeResult<&'a JsonObject> {
    value
        .as_object()
        .ok_or_else(|| DecodeError::type_mismatch(path, "object", json_type_name(value)))
}

/// Reads an optional object field. Absent and `null` both read as `None`.
pub(crate) fn object_field<'a>(
    map: &'a JsonObject,
    field: &str,
    path: &str,
) -> DecodeResult<Option<&'a JsonObject>> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => expect_object(value, &make_path(path, field)).map(Some),
    }
}

/// Reads a signed integer field, defaulting to 0.
pub(crate) fn long_value(map: &JsonObject, field: &str, path: &str) -> DecodeResult<i64> {
    Ok(optional_long(map, field, path)?.unwrap_or(0))
}

/// Reads a signed integer field that has no default.
pub(crate) fn optional_long(map: &JsonObject, field: &str, path: &str) -> DecodeResult<Option<i64>> {
    let value = match map.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(float_to_long)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .ok()
            .or_else(|| s.trim().parse::<f64>().ok().and_then(float_to_long)),
        _ => None,
    };

    parsed.map(Some).ok_or_else(|| {
        DecodeError::type_mismatch(make_path(path, field), "number", json_type_name(value))
    })
}

/// Truncates toward zero; `None` for NaN, infinities and values outside `i64`.
fn float_to_long(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f.trunc() as i64)
    } else {
        None
    }
}

/// Reads a document count or other non-negative integer, defaulting to 0.
pub(crate) fn count_value(map: &JsonObject, field: &str, path: &str) -> DecodeResult<u64> {
    if let Some(Value::Number(n)) = map.get(field) {
        if let Some(count) = n.as_u64() {
            return Ok(count);
        }
    }

    let signed = long_value(map, field, path)?;
    u64::try_from(signed).map_err(|_| {
        DecodeError::type_mismatch(make_path(path, field), "non-negative number", "negative number")
    })
}

/// Reads a floating point field, defaulting to 0.0.
pub(crate) fn double_value(map: &JsonObject, field: &str, path: &str) -> DecodeResult<f64> {
    Ok(optional_double(map, field, path)?.unwrap_or(0.0))
}

/// Reads a floating point field that has no default (e.g. range bounds).
pub(crate) fn optional_double(map: &JsonObject, field: &str, path: &str) -> DecodeResult<Option<f64>> {
    match map.get(field) {
        None => Ok(None),
        Some(value) => double_at(value, &make_path(path, field)),
    }
}

/// Reads a bare value as a floating point number; `null` reads as `None`.
pub(crate) fn double_at(value: &Value, path: &str) -> DecodeResult<Option<f64>> {
    let parsed = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .map(Some)
        .ok_or_else(|| DecodeError::type_mismatch(path, "number", json_type_name(value)))
}

/// Reads an optional string field.
pub(crate) fn optional_string(map: &JsonObject, field: &str, path: &str) -> DecodeResult<Option<String>> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(DecodeError::type_mismatch(
            make_path(path, field),
            "string",
            json_type_name(other),
        )),
    }
}
