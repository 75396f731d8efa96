//! # Dispatcher
//!
//! Buffered line protocol dispatcher.
//!
//! Responsibilities:
//! - Accept encoded points from producers without blocking them
//! - Batch points and flush on size threshold, timer tick or shutdown
//! - Retain and retry batches the sink did not acknowledge
//! - Drain everything queued on finalize

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sinks;
mod worker;

pub use contracts::{DispatcherConfig, EncodedPoint, FieldValue, LineSink, Point};
pub use dispatcher::Dispatcher;
pub use error::{DispatcherError, SubmitError};
pub use handle::DispatcherHandle;
pub use metrics::{DispatcherMetrics, DispatcherState, MetricsSnapshot};
pub use sinks::{HttpSink, LogSink, LINE_PROTOCOL_CONTENT_TYPE};
