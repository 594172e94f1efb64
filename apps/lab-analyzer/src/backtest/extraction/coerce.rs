//! Lenient scalar coercion for vendor JSON fields.
//!
//! The vendor API is loose about types: numbers arrive as JSON numbers or as
//! numeric strings, and optional fields are either absent or `null`. Absent
//! and `null` fields take the type's zero value; anything that cannot be read
//! as the requested scalar is a [`CoercionError`].

use serde_json::{Map, Value};
use thiserror::Error;

/// A field that could not be coerced to the requested scalar type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    /// String value that does not parse as a number.
    #[error("field '{field}' is not numeric: {value:?}")]
    NotNumeric {
        /// Field name.
        field: &'static str,
        /// Raw value as received.
        value: String,
    },

    /// Numeric value that is NaN or infinite.
    #[error("field '{field}' is not finite")]
    NonFinite {
        /// Field name.
        field: &'static str,
    },

    /// Value of a JSON type that has no scalar reading.
    #[error("field '{field}' has unsupported type {kind}")]
    UnsupportedType {
        /// Field name.
        field: &'static str,
        /// JSON type name.
        kind: &'static str,
    },
}

/// JSON type name used in diagnostics.
#[must_use]
pub const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read a field as `f64`, defaulting to `0.0` when absent or `null`.
pub fn float_field(obj: &Map<String, Value>, field: &'static str) -> Result<f64, CoercionError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(0.0),
        Some(value) => coerce_float(value, field),
    }
}

/// Read a field as `i64`, defaulting to `0` when absent or `null`.
///
/// Fractional numbers are truncated toward zero. Strings must hold an integer.
pub fn int_field(obj: &Map<String, Value>, field: &'static str) -> Result<i64, CoercionError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(0),
        Some(value) => coerce_int(value, field),
    }
}

/// Read a field as `String`, defaulting to empty when absent or `null`.
///
/// Never fails: numbers and booleans are rendered, nested values are kept as
/// their JSON text.
#[must_use]
pub fn string_field(obj: &Map<String, Value>, field: &str) -> String {
    match obj.get(field) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Coerce a single JSON value to `f64`.
pub fn coerce_float(value: &Value, field: &'static str) -> Result<f64, CoercionError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| CoercionError::NotNumeric {
            field,
            value: n.to_string(),
        })?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| CoercionError::NotNumeric {
                field,
                value: s.clone(),
            })?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        other => {
            return Err(CoercionError::UnsupportedType {
                field,
                kind: value_kind(other),
            });
        }
    };

    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(CoercionError::NonFinite { field })
    }
}

/// Coerce a single JSON value to `i64`.
pub fn coerce_int(value: &Value, field: &'static str) -> Result<i64, CoercionError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            let f = n.as_f64().ok_or_else(|| CoercionError::NotNumeric {
                field,
                value: n.to_string(),
            })?;
            if f.is_finite() && f.abs() < i64::MAX as f64 {
                Ok(f.trunc() as i64)
            } else {
                Err(CoercionError::NonFinite { field })
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| CoercionError::NotNumeric {
                field,
                value: s.clone(),
            }),
        Value::Bool(b) => Ok(i64::from(*b)),
        other => Err(CoercionError::UnsupportedType {
            field,
            kind: value_kind(other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test_case(json!({"x": 12.5}), 12.5 ; "number")]
    #[test_case(json!({"x": "12.5"}), 12.5 ; "numeric string")]
    #[test_case(json!({"x": " -3 "}), -3.0 ; "padded string")]
    #[test_case(json!({"x": null}), 0.0 ; "null")]
    #[test_case(json!({}), 0.0 ; "absent")]
    #[test_case(json!({"x": true}), 1.0 ; "bool")]
    fn test_float_field_accepts(raw: Value, expected: f64) {
        assert_eq!(float_field(&object(raw), "x"), Ok(expected));
    }

    #[test]
    fn test_float_field_rejects() {
        let obj = object(json!({"a": "abc", "b": "NaN", "c": [1], "d": ""}));
        assert!(matches!(
            float_field(&obj, "a"),
            Err(CoercionError::NotNumeric { field: "a", .. })
        ));
        assert_eq!(
            float_field(&obj, "b"),
            Err(CoercionError::NonFinite { field: "b" })
        );
        assert_eq!(
            float_field(&obj, "c"),
            Err(CoercionError::UnsupportedType {
                field: "c",
                kind: "array"
            })
        );
        assert!(float_field(&obj, "d").is_err());
    }

    #[test_case(json!({"x": 1_700_000_000}), 1_700_000_000 ; "integer")]
    #[test_case(json!({"x": 12.9}), 12 ; "fraction truncates")]
    #[test_case(json!({"x": -12.9}), -12 ; "negative fraction truncates")]
    #[test_case(json!({"x": "42"}), 42 ; "integer string")]
    #[test_case(json!({}), 0 ; "absent")]
    fn test_int_field_accepts(raw: Value, expected: i64) {
        assert_eq!(int_field(&object(raw), "x"), Ok(expected));
    }

    #[test]
    fn test_int_field_rejects_fractional_string() {
        let obj = object(json!({"x": "12.5"}));
        assert!(int_field(&obj, "x").is_err());
    }

    #[test]
    fn test_string_field() {
        let obj = object(json!({"s": "abc", "n": 42, "z": null}));
        assert_eq!(string_field(&obj, "s"), "abc");
        assert_eq!(string_field(&obj, "n"), "42");
        assert_eq!(string_field(&obj, "z"), "");
        assert_eq!(string_field(&obj, "missing"), "");
    }
}
