//! DispatcherHandle - producer side of the dispatcher channel
//!
//! Encodes on the caller's task and enqueues without ever blocking.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use contracts::{EncodedPoint, Point};

use crate::error::SubmitError;
use crate::metrics::{DispatcherMetrics, DispatcherState, MetricsSnapshot};

/// Cloneable submission handle
///
/// Any number of producer tasks or threads may hold a clone.
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    /// Sink name
    name: Arc<str>,
    /// Channel to the dispatcher loop
    tx: mpsc::Sender<EncodedPoint>,
    /// Shared metrics
    metrics: Arc<DispatcherMetrics>,
}

impl DispatcherHandle {
    pub(crate) fn new(
        name: Arc<str>,
        tx: mpsc::Sender<EncodedPoint>,
        metrics: Arc<DispatcherMetrics>,
    ) -> Self {
        Self { name, tx, metrics }
    }

    /// Sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle state of the dispatcher
    pub fn state(&self) -> DispatcherState {
        self.metrics.state()
    }

    /// Current metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Encode a point and enqueue it (non-blocking)
    ///
    /// # Errors
    /// - [`SubmitError::Encoding`]: the point cannot be encoded, channel untouched
    /// - [`SubmitError::BufferFull`]: the channel is full, point dropped
    /// - [`SubmitError::Closed`]: the dispatcher is shutting down
    pub fn submit(&self, point: &Point) -> Result<(), SubmitError> {
        let encoded = line_protocol::encode(point).map_err(|e| {
            self.reject("encoding");
            debug!(sink = %self.name, measurement = point.name(), error = %e, "Point encoding failed");
            SubmitError::Encoding(e)
        })?;
        self.submit_encoded(encoded)
    }

    /// Enqueue an already encoded line (non-blocking)
    pub fn submit_encoded(&self, point: EncodedPoint) -> Result<(), SubmitError> {
        match self.tx.try_send(point) {
            Ok(()) => {
                self.metrics.inc_queued_count();
                observability::record_point_queued(&self.name);
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.reject("buffer_full");
                warn!(sink = %self.name, "Buffer full, point rejected");
                Err(SubmitError::BufferFull {
                    sink_name: self.name.to_string(),
                })
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.reject("closed");
                debug!(sink = %self.name, "Dispatcher closed, point rejected");
                Err(SubmitError::Closed {
                    sink_name: self.name.to_string(),
                })
            }
        }
    }

    fn reject(&self, reason: &'static str) {
        self.metrics.inc_rejected_count();
        observability::record_point_rejected(&self.name, reason);
    }
}
