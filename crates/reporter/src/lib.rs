//! # Reporter
//!
//! Producer-facing facades over a [`DispatcherHandle`](dispatcher::DispatcherHandle).
//!
//! - [`Metric`]: named measurement tagged `type=metric`, with an elapsed-time helper
//! - [`ErrorReporter`]: error counter tagged `type=error`, `value=1`
//!
//! Both inject the `hostname` tag; caller-supplied `hostname`/`type` tags are overwritten.
//!
//! ## Example
//!
//! ```ignore
//! let dispatcher = Dispatcher::connect(&DispatcherConfig::for_database("db", "telemetry"))?;
//! let latency = Metric::new(dispatcher.handle(), "request_latency", "web-01", tags, fields);
//!
//! let start = Instant::now();
//! handle_request().await;
//! latency.write_time(start)?;
//! ```

mod error_reporter;
mod metric;

pub use error_reporter::ErrorReporter;
pub use metric::Metric;

use contracts::{FieldValue, ValueMap, HOSTNAME_TAG, TYPE_TAG};

/// Field written by `Metric::write_time` and `ErrorReporter`
pub const VALUE_FIELD: &str = "value";

/// Overlay the fixed `hostname` and `type` tags
fn inject_identity(tags: &mut ValueMap, hostname: &str, kind: &str) {
    tags.insert(HOSTNAME_TAG.to_string(), FieldValue::from(hostname));
    tags.insert(TYPE_TAG.to_string(), FieldValue::from(kind));
}
