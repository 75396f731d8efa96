//! Line protocol error types

use thiserror::Error;

/// Encoding errors
///
/// Returned synchronously to the submitter; an encoding failure never reaches the dispatcher loop.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    /// Measurement name is empty
    #[error("measurement name cannot be empty")]
    EmptyMeasurement,

    /// Point has no fields
    #[error("measurement '{measurement}' has no fields")]
    NoFields { measurement: String },

    /// Tag or field key is empty
    #[error("measurement '{measurement}' has an empty {element} key")]
    EmptyKey {
        measurement: String,
        element: &'static str,
    },

    /// Tag value renders to an empty string
    #[error("tag '{key}' of measurement '{measurement}' has an empty value")]
    EmptyTagValue { measurement: String, key: String },

    /// NaN or infinite float
    #[error("{element} '{key}' holds a non-finite float ({value})")]
    NonFiniteFloat {
        element: &'static str,
        key: String,
        value: f64,
    },

    /// Newlines cannot be represented in a single line
    #[error("{element} '{text}' contains a line break")]
    LineBreak { element: &'static str, text: String },

    /// Current time is outside the nanosecond range
    #[error("timestamp out of range for nanosecond precision")]
    TimestampOutOfRange,

    /// Dynamic value outside the scalar model (array, object, null...)
    #[error("unsupported value of kind {kind}")]
    UnsupportedValue { kind: &'static str },
}

/// Parse errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Measurement name missing
    #[error("missing measurement name")]
    MissingMeasurement,

    /// Tag without `=`
    #[error("tag '{key}' has no value")]
    MissingTagValue { key: String },

    /// Field section missing or empty
    #[error("missing field set")]
    MissingFields,

    /// Quoted string not closed
    #[error("unterminated string value for field '{key}'")]
    UnterminatedString { key: String },

    /// Field value not parseable
    #[error("invalid value '{value}' for field '{key}'")]
    InvalidValue { key: String, value: String },

    /// Timestamp not an integer
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}
