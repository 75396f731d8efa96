//! Dispatcher counters and lifecycle state
//!
//! Shared between producer handles and the loop task; all fields are atomics.

use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};

/// Dispatcher lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    /// Accepting points and flushing
    Running,
    /// Shutdown requested, flushing what is left
    Draining,
    /// Loop exited
    Terminated,
}

impl DispatcherState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Running,
            1 => Self::Draining,
            _ => Self::Terminated,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Running => 0,
            Self::Draining => 1,
            Self::Terminated => 2,
        }
    }
}

/// Metrics for a single dispatcher
#[derive(Debug, Default)]
pub struct DispatcherMetrics {
    /// Lifecycle state (see [`DispatcherState`])
    state: AtomicU8,
    /// Current batch length
    batch_len: AtomicUsize,
    /// Points accepted into the channel
    queued_count: AtomicU64,
    /// Points rejected at submit (encoding, full, closed)
    rejected_count: AtomicU64,
    /// Successful flushes
    flush_count: AtomicU64,
    /// Failed flushes
    failure_count: AtomicU64,
    /// Points acknowledged by the sink
    written_count: AtomicU64,
}

impl DispatcherMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DispatcherState {
        DispatcherState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn set_state(&self, state: DispatcherState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }

    pub fn batch_len(&self) -> usize {
        self.batch_len.load(Ordering::Relaxed)
    }

    pub fn set_batch_len(&self, len: usize) {
        self.batch_len.store(len, Ordering::Relaxed);
    }

    pub fn queued_count(&self) -> u64 {
        self.queued_count.load(Ordering::Relaxed)
    }

    pub fn inc_queued_count(&self) {
        self.queued_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rejected_count(&self) -> u64 {
        self.rejected_count.load(Ordering::Relaxed)
    }

    pub fn inc_rejected_count(&self) {
        self.rejected_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn flush_count(&self) -> u64 {
        self.flush_count.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn written_count(&self) -> u64 {
        self.written_count.load(Ordering::Relaxed)
    }

    /// Account for one flush attempt of `points` lines
    pub fn record_flush(&self, success: bool, points: usize) {
        if success {
            self.flush_count.fetch_add(1, Ordering::Relaxed);
            self.written_count.fetch_add(points as u64, Ordering::Relaxed);
        } else {
            self.failure_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            state: self.state(),
            batch_len: self.batch_len(),
            queued_count: self.queued_count(),
            rejected_count: self.rejected_count(),
            flush_count: self.flush_count(),
            failure_count: self.failure_count(),
            written_count: self.written_count(),
        }
    }
}

/// Snapshot of dispatcher metrics (for reporting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub state: DispatcherState,
    pub batch_len: usize,
    pub queued_count: u64,
    pub rejected_count: u64,
    pub flush_count: u64,
    pub failure_count: u64,
    pub written_count: u64,
}
