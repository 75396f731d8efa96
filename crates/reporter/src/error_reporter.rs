//! ErrorReporter - counts error occurrences per measurement name

use contracts::{FieldValue, Point, ValueMap};
use dispatcher::{DispatcherHandle, SubmitError};
use serde_json::Value;

use crate::metric::json_map_or_empty;
use crate::{inject_identity, VALUE_FIELD};

/// Error report facade
///
/// Every report is a point tagged `type=error` with field `value=1i`; the
/// measurement name identifies the error.
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    handle: DispatcherHandle,
    tags: ValueMap,
    fields: ValueMap,
}

impl ErrorReporter {
    /// Create a reporter, tagging reports with `hostname` and `type=error`
    pub fn new(
        handle: DispatcherHandle,
        hostname: &str,
        mut tags: ValueMap,
        mut fields: ValueMap,
    ) -> Self {
        inject_identity(&mut tags, hostname, "error");
        fields.insert(VALUE_FIELD.to_string(), FieldValue::Integer(1));
        Self {
            handle,
            tags,
            fields,
        }
    }

    /// Create a reporter from untyped JSON objects (`null` means empty)
    pub fn from_json(
        handle: DispatcherHandle,
        hostname: &str,
        tags: &Value,
        fields: &Value,
    ) -> Result<Self, SubmitError> {
        let tags = json_map_or_empty(tags)?;
        let fields = json_map_or_empty(fields)?;
        Ok(Self::new(handle, hostname, tags, fields))
    }

    /// Point reported under `name`
    pub fn point(&self, name: &str) -> Point {
        Point::with_sets(name, self.tags.clone(), self.fields.clone())
    }

    /// Report one occurrence of the error `name`
    pub fn report(&self, name: &str) -> Result<(), SubmitError> {
        self.handle.submit(&self.point(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{recording_dispatcher, RecordingSink};
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn test_report_writes_error_point() {
        let sink = RecordingSink::default();
        let dispatcher = recording_dispatcher(&sink);

        let mut tags = ValueMap::new();
        tags.insert("service".to_string(), FieldValue::from("api"));
        let reporter = ErrorReporter::new(dispatcher.handle(), "h1", tags, ValueMap::new());

        reporter.report("db_timeout").unwrap();
        reporter.report("db_timeout").unwrap();
        dispatcher.finalize().await.unwrap();

        let lines = sink.lines();
        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert!(line.starts_with("db_timeout,hostname=h1,service=api,type=error value=1i "));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_value_field_is_fixed() {
        let sink = RecordingSink::default();
        let dispatcher = recording_dispatcher(&sink);

        let reporter = ErrorReporter::from_json(
            dispatcher.handle(),
            "h1",
            &Value::Null,
            &json!({"value": 42, "code": 503}),
        )
        .unwrap();
        let point = reporter.point("upstream");
        assert_eq!(point.fields().get("value"), Some(&FieldValue::Integer(1)));
        assert_eq!(point.fields().get("code"), Some(&FieldValue::Integer(503)));

        dispatcher.finalize().await.unwrap();
    }
}
