//! Dispatcher loop - batches encoded points and flushes them to the sink
//!
//! Runs as a single task. The batch lives only here, so at most one flush is
//! ever in flight and the batch needs no lock.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use contracts::{EncodedPoint, LineSink};
use observability::FlushStats;

use crate::metrics::{DispatcherMetrics, DispatcherState};

/// Loop settings taken from the dispatcher configuration
#[derive(Debug, Clone, Copy)]
pub(crate) struct WorkerSettings {
    pub max_batch_size: usize,
    pub flush_interval: Duration,
}

pub(crate) struct Worker<S> {
    sink: S,
    name: Arc<str>,
    rx: mpsc::Receiver<EncodedPoint>,
    shutdown_rx: oneshot::Receiver<()>,
    batch: Vec<EncodedPoint>,
    settings: WorkerSettings,
    metrics: Arc<DispatcherMetrics>,
    stats: FlushStats,
}

impl<S: LineSink> Worker<S> {
    pub(crate) fn new(
        sink: S,
        name: Arc<str>,
        rx: mpsc::Receiver<EncodedPoint>,
        shutdown_rx: oneshot::Receiver<()>,
        settings: WorkerSettings,
        metrics: Arc<DispatcherMetrics>,
    ) -> Self {
        Self {
            sink,
            name,
            rx,
            shutdown_rx,
            batch: Vec::with_capacity(settings.max_batch_size),
            settings,
            metrics,
            stats: FlushStats::new(),
        }
    }

    /// Run until shutdown is requested and every queued point is flushed
    #[instrument(name = "dispatcher_loop", skip(self), fields(sink = %self.name))]
    pub(crate) async fn run(mut self) {
        info!(
            max_batch_size = self.settings.max_batch_size,
            flush_interval_ms = self.settings.flush_interval.as_millis() as u64,
            "Dispatcher loop started"
        );

        let period = self.settings.flush_interval;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut draining = false;

        loop {
            // A full batch (e.g. retained after failed flushes) stops intake so
            // producers see backpressure once the channel fills up.
            let accepting = !draining && self.batch.len() < self.settings.max_batch_size;

            tokio::select! {
                // Err means the Dispatcher was dropped without finalize
                _ = &mut self.shutdown_rx, if !draining => {
                    self.drain().await;
                    draining = true;
                }
                received = self.rx.recv(), if accepting => match received {
                    Some(point) => {
                        self.push(point);
                        if self.batch.len() < self.settings.max_batch_size {
                            continue;
                        }
                    }
                    None => {
                        self.drain().await;
                        draining = true;
                    }
                },
                _ = ticker.tick() => {}
            }

            let flushed = self.flush().await;
            if draining && flushed {
                break;
            }
        }

        self.terminate().await;
    }

    fn push(&mut self, point: EncodedPoint) {
        self.batch.push(point);
        self.metrics.set_batch_len(self.batch.len());
    }

    /// Close the channel and move everything still queued into the batch,
    /// ignoring the size threshold
    async fn drain(&mut self) {
        self.metrics.set_state(DispatcherState::Draining);
        self.rx.close();

        let before = self.batch.len();
        while let Some(point) = self.rx.recv().await {
            self.push(point);
        }

        info!(
            drained = self.batch.len() - before,
            batch_len = self.batch.len(),
            "Shutdown requested, draining"
        );
    }

    /// Flush the batch; returns true when the batch is empty afterwards
    #[instrument(name = "dispatcher_flush", skip(self), fields(points = self.batch.len()))]
    async fn flush(&mut self) -> bool {
        if self.batch.is_empty() {
            return true;
        }

        let points = self.batch.len();
        let body = join_batch(&self.batch);
        let started = Instant::now();
        let result = self.sink.write(&body).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        let success = result.is_ok();
        self.metrics.record_flush(success, points);
        self.stats.update(success, points, elapsed_ms);
        observability::record_flush(&self.name, success, points, elapsed_ms);

        match result {
            Ok(()) => {
                debug!(points, bytes = body.len(), elapsed_ms, "Batch flushed");
                self.batch.clear();
                self.metrics.set_batch_len(0);
                observability::record_batch_len(&self.name, 0);
                true
            }
            Err(e) => {
                // Keep the batch; the next trigger resends it
                warn!(points, error = %e, "Flush failed, batch retained");
                observability::record_batch_len(&self.name, points);
                false
            }
        }
    }

    async fn terminate(mut self) {
        if let Err(e) = self.sink.close().await {
            error!(sink = %self.name, error = %e, "Close failed on shutdown");
        }
        self.metrics.set_state(DispatcherState::Terminated);
        info!(sink = %self.name, summary = %self.stats.summary(), "Dispatcher loop stopped");
    }
}

/// Newline-joined batch body
fn join_batch(batch: &[EncodedPoint]) -> String {
    let capacity = batch.iter().map(|p| p.as_str().len() + 1).sum();
    let mut body = String::with_capacity(capacity);
    for (idx, point) in batch.iter().enumerate() {
        if idx > 0 {
            body.push('\n');
        }
        body.push_str(point.as_str());
    }
    body
}
