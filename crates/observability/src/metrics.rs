//! Dispatcher metrics
//!
//! Process-wide counters exported through the `metrics` facade, plus an
//! in-memory flush aggregator used for shutdown summaries.

use metrics::{counter, gauge, histogram};

/// Record a point accepted into the dispatcher channel
pub fn record_point_queued(sink_name: &str) {
    counter!(
        "line_dispatch_points_queued_total",
        "sink" => sink_name.to_string()
    )
    .increment(1);
}

/// Record a point rejected by the submission facade
///
/// `reason` is one of `encoding`, `buffer_full`, `closed`.
pub fn record_point_rejected(sink_name: &str, reason: &'static str) {
    counter!(
        "line_dispatch_points_rejected_total",
        "sink" => sink_name.to_string(),
        "reason" => reason
    )
    .increment(1);
}

/// Record one flush attempt
pub fn record_flush(sink_name: &str, success: bool, points: usize, duration_ms: f64) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "line_dispatch_flushes_total",
        "sink" => sink_name.to_string(),
        "status" => status
    )
    .increment(1);

    histogram!(
        "line_dispatch_flush_duration_ms",
        "sink" => sink_name.to_string()
    )
    .record(duration_ms);

    if success {
        counter!(
            "line_dispatch_points_written_total",
            "sink" => sink_name.to_string()
        )
        .increment(points as u64);
    }
}

/// Record the current batch length
pub fn record_batch_len(sink_name: &str, len: usize) {
    gauge!(
        "line_dispatch_batch_len",
        "sink" => sink_name.to_string()
    )
    .set(len as f64);
}

/// Flush statistics aggregator
///
/// Kept by the dispatcher loop and logged when it terminates.
#[derive(Debug, Clone, Default)]
pub struct FlushStats {
    /// Successful flushes
    pub succeeded: u64,
    /// Failed flushes (batch retained)
    pub failed: u64,
    /// Points acknowledged by the sink
    pub points_written: u64,
    /// Batch size of successful flushes
    pub batch_sizes: RunningStats,
    /// Duration of every attempt (ms)
    pub durations_ms: RunningStats,
}

impl FlushStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one flush attempt
    pub fn update(&mut self, success: bool, points: usize, duration_ms: f64) {
        self.durations_ms.push(duration_ms);
        if success {
            self.succeeded += 1;
            self.points_written += points as u64;
            self.batch_sizes.push(points as f64);
        } else {
            self.failed += 1;
        }
    }

    pub fn summary(&self) -> FlushSummary {
        let attempts = self.succeeded + self.failed;
        FlushSummary {
            succeeded: self.succeeded,
            failed: self.failed,
            points_written: self.points_written,
            failure_rate: if attempts > 0 {
                self.failed as f64 / attempts as f64 * 100.0
            } else {
                0.0
            },
            mean_batch_size: self.batch_sizes.mean(),
            max_duration_ms: self.durations_ms.max(),
        }
    }
}

/// Flush summary
#[derive(Debug, Clone, Default)]
pub struct FlushSummary {
    pub succeeded: u64,
    pub failed: u64,
    pub points_written: u64,
    pub failure_rate: f64,
    pub mean_batch_size: f64,
    pub max_duration_ms: f64,
}

impl std::fmt::Display for FlushSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "flushes={} failed={} ({:.2}%) points={} mean_batch={:.1} max_ms={:.3}",
            self.succeeded,
            self.failed,
            self.failure_rate,
            self.points_written,
            self.mean_batch_size,
            self.max_duration_ms
        )
    }
}

/// Online mean/min/max (Welford)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
            self.mean += (value - self.mean) / self.count as f64;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
