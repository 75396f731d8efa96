//! Point / EncodedPoint - producer input and channel payload
//!
//! A [`Point`] is built by producers and turned into an [`EncodedPoint`]
//! by the line protocol encoder before it is enqueued.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::FieldValue;

/// Tag or field set, ordered by key so encoding is deterministic
pub type ValueMap = BTreeMap<String, FieldValue>;

/// Tag key holding the reporting host
pub const HOSTNAME_TAG: &str = "hostname";

/// Tag key discriminating metrics from error reports
pub const TYPE_TAG: &str = "type";

/// Logical measurement record
///
/// The timestamp is not part of the point; it is assigned at encode time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    name: String,
    #[serde(default)]
    tags: ValueMap,
    fields: ValueMap,
}

impl Point {
    /// Create an empty point with the given measurement name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: ValueMap::new(),
            fields: ValueMap::new(),
        }
    }

    /// Create a point from prebuilt tag and field sets
    pub fn with_sets(name: impl Into<String>, tags: ValueMap, fields: ValueMap) -> Self {
        Self {
            name: name.into(),
            tags,
            fields,
        }
    }

    /// Add (or replace) a tag
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Add (or replace) a field
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &ValueMap {
        &self.tags
    }

    pub fn fields(&self) -> &ValueMap {
        &self.fields
    }
}

/// One serialized line protocol record
///
/// Opaque and immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPoint(String);

impl EncodedPoint {
    /// Wrap an already serialized line
    ///
    /// The caller guarantees `line` is a single line protocol record.
    pub fn from_line(line: impl Into<String>) -> Self {
        Self(line.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EncodedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
