//! Dispatcher - lifecycle controller for one destination
//!
//! `spawn`/`connect` start the loop task; `finalize` runs the two-phase
//! shutdown: request signal, then wait for the loop to drain and exit.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use contracts::{DispatcherConfig, LineSink, Point};

use crate::error::{DispatcherError, SubmitError};
use crate::handle::DispatcherHandle;
use crate::metrics::{DispatcherMetrics, DispatcherState, MetricsSnapshot};
use crate::sinks::HttpSink;
use crate::worker::{Worker, WorkerSettings};

/// Buffered dispatcher for a single destination
///
/// Dropping a `Dispatcher` without finalizing also starts the drain, but
/// nothing waits for it.
#[derive(Debug)]
pub struct Dispatcher {
    handle: DispatcherHandle,
    metrics: Arc<DispatcherMetrics>,
    shutdown_tx: oneshot::Sender<()>,
    worker_handle: JoinHandle<()>,
}

impl Dispatcher {
    /// Start a dispatcher writing to an InfluxDB HTTP endpoint
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(name = "dispatcher_connect", skip(config), fields(url = %config.write_url))]
    pub fn connect(config: &DispatcherConfig) -> Result<Self, DispatcherError> {
        config.validate()?;
        let sink = HttpSink::from_config(config)
            .map_err(|e| DispatcherError::sink_creation(HttpSink::DEFAULT_NAME, e.to_string()))?;
        Self::spawn(config, sink)
    }

    /// Start a dispatcher writing to the given sink
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(name = "dispatcher_spawn", skip(config, sink), fields(sink = %sink.name()))]
    pub fn spawn<S: LineSink + Send + 'static>(
        config: &DispatcherConfig,
        sink: S,
    ) -> Result<Self, DispatcherError> {
        config.validate()?;

        let name: Arc<str> = Arc::from(sink.name());
        let (tx, rx) = mpsc::channel(config.queue_capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let metrics = Arc::new(DispatcherMetrics::new());

        let settings = WorkerSettings {
            max_batch_size: config.max_batch_size,
            flush_interval: config.flush_interval(),
        };
        let worker = Worker::new(
            sink,
            Arc::clone(&name),
            rx,
            shutdown_rx,
            settings,
            Arc::clone(&metrics),
        );
        let worker_handle = tokio::spawn(worker.run());

        info!(
            sink = %name,
            queue_capacity = config.queue_capacity,
            "Dispatcher started"
        );

        Ok(Self {
            handle: DispatcherHandle::new(name, tx, Arc::clone(&metrics)),
            metrics,
            shutdown_tx,
            worker_handle,
        })
    }

    /// Cloneable submission handle for producers
    pub fn handle(&self) -> DispatcherHandle {
        self.handle.clone()
    }

    /// Encode and enqueue a point (see [`DispatcherHandle::submit`])
    pub fn submit(&self, point: &Point) -> Result<(), SubmitError> {
        self.handle.submit(point)
    }

    /// Sink name
    pub fn name(&self) -> &str {
        self.handle.name()
    }

    pub fn state(&self) -> DispatcherState {
        self.metrics.state()
    }

    /// Get current metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Request shutdown and wait until every queued point has been flushed
    ///
    /// Consumes the dispatcher, so it can only be called once. Waits for as
    /// long as the sink keeps failing; use [`Dispatcher::finalize_with_deadline`]
    /// to bound the wait.
    #[instrument(name = "dispatcher_finalize", skip(self), fields(sink = %self.name()))]
    pub async fn finalize(self) -> Result<(), DispatcherError> {
        let (name, worker_handle) = self.request_shutdown();
        join_worker(&name, worker_handle.await)
    }

    /// Like [`Dispatcher::finalize`], but gives up waiting after `deadline`
    ///
    /// On timeout the loop is left running and keeps draining in the background.
    #[instrument(name = "dispatcher_finalize_with_deadline", skip(self), fields(sink = %self.name()))]
    pub async fn finalize_with_deadline(self, deadline: Duration) -> Result<(), DispatcherError> {
        let (name, mut worker_handle) = self.request_shutdown();
        match tokio::time::timeout(deadline, &mut worker_handle).await {
            Ok(joined) => join_worker(&name, joined),
            Err(_) => {
                warn!(sink = %name, "Dispatcher finalization timed out, still draining");
                Err(DispatcherError::ShutdownTimeout {
                    name,
                    waited_ms: deadline.as_millis() as u64,
                })
            }
        }
    }

    fn request_shutdown(self) -> (String, JoinHandle<()>) {
        let name = self.handle.name().to_string();
        // The loop only drops the receiver when it has already stopped
        let _ = self.shutdown_tx.send(());
        info!(sink = %name, "Shutdown requested");
        (name, self.worker_handle)
    }
}

fn join_worker(
    name: &str,
    joined: Result<(), tokio::task::JoinError>,
) -> Result<(), DispatcherError> {
    joined.map_err(|e| {
        error!(sink = %name, error = ?e, "Dispatcher task failed");
        DispatcherError::TaskFailed {
            name: name.to_string(),
            message: e.to_string(),
        }
    })?;
    info!(sink = %name, "Dispatcher shutdown complete");
    Ok(())
}
