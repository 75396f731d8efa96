//! Metric - named measurement with fixed tags and fields

use std::time::Instant;

use contracts::{FieldValue, Point, ValueMap};
use dispatcher::{DispatcherHandle, SubmitError};
use serde_json::Value;
use tracing::trace;

use crate::{inject_identity, VALUE_FIELD};

/// Measurement facade
///
/// Holds the dispatcher handle plus a fixed tag/field overlay; every write
/// goes through [`DispatcherHandle::submit`].
#[derive(Debug, Clone)]
pub struct Metric {
    handle: DispatcherHandle,
    name: String,
    tags: ValueMap,
    fields: ValueMap,
}

impl Metric {
    /// Create a metric, tagging it with `hostname` and `type=metric`
    pub fn new(
        handle: DispatcherHandle,
        name: impl Into<String>,
        hostname: &str,
        mut tags: ValueMap,
        fields: ValueMap,
    ) -> Self {
        inject_identity(&mut tags, hostname, "metric");
        Self {
            handle,
            name: name.into(),
            tags,
            fields,
        }
    }

    /// Create a metric from untyped JSON objects
    ///
    /// # Errors
    /// [`SubmitError::Encoding`] when a value is not a scalar.
    pub fn from_json(
        handle: DispatcherHandle,
        name: impl Into<String>,
        hostname: &str,
        tags: &Value,
        fields: &Value,
    ) -> Result<Self, SubmitError> {
        let tags = json_map_or_empty(tags)?;
        let fields = json_map_or_empty(fields)?;
        Ok(Self::new(handle, name, hostname, tags, fields))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Point carrying the stored tags and fields
    pub fn point(&self) -> Point {
        Point::with_sets(self.name.clone(), self.tags.clone(), self.fields.clone())
    }

    /// Submit the stored fields
    pub fn write(&self) -> Result<(), SubmitError> {
        self.handle.submit(&self.point())
    }

    /// Submit the stored fields plus `value` = seconds elapsed since `start`
    pub fn write_time(&self, start: Instant) -> Result<(), SubmitError> {
        let elapsed = start.elapsed().as_secs_f64();
        trace!(metric = %self.name, elapsed, "Writing elapsed time");

        let point = self.point().field(VALUE_FIELD, FieldValue::Float(elapsed));
        self.handle.submit(&point)
    }
}

pub(crate) fn json_map_or_empty(value: &Value) -> Result<ValueMap, SubmitError> {
    if value.is_null() {
        return Ok(ValueMap::new());
    }
    Ok(line_protocol::map_from_json(value)?)
}
