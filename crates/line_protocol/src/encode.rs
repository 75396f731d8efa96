//! Point encoder
//!
//! Pure transformation apart from reading the clock in [`encode`].

use std::fmt::Write;

use contracts::{EncodedPoint, FieldValue, Point};

use crate::error::EncodeError;
use crate::escape::{self, has_line_break, push_escaped};

/// Encode a point, stamping it with the current time
pub fn encode(point: &Point) -> Result<EncodedPoint, EncodeError> {
    encode_at(point, now_nanos()?)
}

/// Current wall-clock time in nanoseconds since the Unix epoch
pub fn now_nanos() -> Result<i64, EncodeError> {
    chrono::Utc::now()
        .timestamp_nanos_opt()
        .ok_or(EncodeError::TimestampOutOfRange)
}

/// Encode a point with an explicit timestamp (nanoseconds)
pub fn encode_at(point: &Point, timestamp_ns: i64) -> Result<EncodedPoint, EncodeError> {
    let name = point.name();
    if name.is_empty() {
        return Err(EncodeError::EmptyMeasurement);
    }
    if point.fields().is_empty() {
        return Err(EncodeError::NoFields {
            measurement: name.to_string(),
        });
    }
    check_line_break("measurement", name)?;

    let mut line = String::with_capacity(64);
    push_escaped(&mut line, name, escape::MEASUREMENT);

    for (key, value) in point.tags() {
        line.push(',');
        push_key(&mut line, name, "tag", key)?;
        line.push('=');
        push_tag_value(&mut line, name, key, value)?;
    }

    line.push(' ');
    for (idx, (key, value)) in point.fields().iter().enumerate() {
        if idx > 0 {
            line.push(',');
        }
        push_key(&mut line, name, "field", key)?;
        line.push('=');
        push_field_value(&mut line, key, value)?;
    }

    line.push(' ');
    // Writing to a String cannot fail
    let _ = write!(line, "{timestamp_ns}");

    Ok(EncodedPoint::from_line(line))
}

fn check_line_break(element: &'static str, text: &str) -> Result<(), EncodeError> {
    if has_line_break(text) {
        return Err(EncodeError::LineBreak {
            element,
            text: text.to_string(),
        });
    }
    Ok(())
}

fn check_finite(element: &'static str, key: &str, value: &FieldValue) -> Result<(), EncodeError> {
    match value {
        FieldValue::Float(v) if !v.is_finite() => Err(EncodeError::NonFiniteFloat {
            element,
            key: key.to_string(),
            value: *v,
        }),
        _ => Ok(()),
    }
}

fn push_key(
    line: &mut String,
    measurement: &str,
    element: &'static str,
    key: &str,
) -> Result<(), EncodeError> {
    if key.is_empty() {
        return Err(EncodeError::EmptyKey {
            measurement: measurement.to_string(),
            element,
        });
    }
    check_line_break(element, key)?;
    push_escaped(line, key, escape::KEY);
    Ok(())
}

/// Tags are always text on the wire
fn push_tag_value(
    line: &mut String,
    measurement: &str,
    key: &str,
    value: &FieldValue,
) -> Result<(), EncodeError> {
    check_finite("tag", key, value)?;
    let text = value.to_string();
    if text.is_empty() {
        return Err(EncodeError::EmptyTagValue {
            measurement: measurement.to_string(),
            key: key.to_string(),
        });
    }
    check_line_break("tag value", &text)?;
    push_escaped(line, &text, escape::KEY);
    Ok(())
}

fn push_field_value(line: &mut String, key: &str, value: &FieldValue) -> Result<(), EncodeError> {
    check_finite("field", key, value)?;
    match value {
        FieldValue::Boolean(b) => {
            let _ = write!(line, "{b}");
        }
        FieldValue::Integer(i) => {
            let _ = write!(line, "{i}i");
        }
        // Shortest round-trip representation; no `i` suffix keeps it a float
        FieldValue::Float(v) => {
            let _ = write!(line, "{v}");
        }
        FieldValue::String(s) => {
            check_line_break("field value", s)?;
            line.push('"');
            push_escaped(line, s, escape::STRING_FIELD);
            line.push('"');
        }
    }
    Ok(())
}
