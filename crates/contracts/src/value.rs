//! FieldValue - scalar value model
//!
//! Closed sum type for tag and field values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar value attached to a tag or a field
///
/// Deserializes untagged, so `42` becomes [`FieldValue::Integer`] and `0.5`
/// becomes [`FieldValue::Float`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl FieldValue {
    /// Kind name (used in diagnostics)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }

    /// String content, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Plain text rendering, without quoting or escaping
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Integer(v.into())
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        Self::Integer(v.into())
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        Self::Float(v.into())
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_unquoted() {
        assert_eq!(FieldValue::from("h1").to_string(), "h1");
        assert_eq!(FieldValue::from(42i64).to_string(), "42");
        assert_eq!(FieldValue::from(0.42).to_string(), "0.42");
        assert_eq!(FieldValue::from(true).to_string(), "true");
    }

    #[test]
    fn test_untagged_deserialize() {
        let values: Vec<FieldValue> = serde_json::from_str(r#"[true, 7, 1.5, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                FieldValue::Boolean(true),
                FieldValue::Integer(7),
                FieldValue::Float(1.5),
                FieldValue::String("x".to_string()),
            ]
        );
    }
}
