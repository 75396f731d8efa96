//! Conversion from dynamically typed JSON values
//!
//! Entry point for callers holding untyped tag/field maps. Anything outside
//! the scalar model is an encoding error.

use contracts::{FieldValue, ValueMap};
use serde_json::Value;

use crate::error::EncodeError;

/// Convert a JSON scalar into a [`FieldValue`]
pub fn value_from_json(value: &Value) -> Result<FieldValue, EncodeError> {
    match value {
        Value::Bool(b) => Ok(FieldValue::Boolean(*b)),
        Value::String(s) => Ok(FieldValue::String(s.clone())),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(FieldValue::Integer(i))
            } else if n.is_u64() {
                Err(EncodeError::UnsupportedValue {
                    kind: "unsigned integer above i64::MAX",
                })
            } else {
                n.as_f64()
                    .map(FieldValue::Float)
                    .ok_or(EncodeError::UnsupportedValue { kind: "number" })
            }
        }
        Value::Null => Err(EncodeError::UnsupportedValue { kind: "null" }),
        Value::Array(_) => Err(EncodeError::UnsupportedValue { kind: "array" }),
        Value::Object(_) => Err(EncodeError::UnsupportedValue { kind: "object" }),
    }
}

/// Convert a JSON object of scalars into a tag or field set
pub fn map_from_json(value: &Value) -> Result<ValueMap, EncodeError> {
    let object = value
        .as_object()
        .ok_or(EncodeError::UnsupportedValue { kind: "non-object map" })?;

    object
        .iter()
        .map(|(key, v)| Ok((key.clone(), value_from_json(v)?)))
        .collect()
}
