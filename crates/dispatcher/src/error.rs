//! Dispatcher error types

use line_protocol::EncodeError;
use thiserror::Error;

/// Lifecycle errors (construction and finalization)
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Finalize deadline elapsed; the loop keeps draining in the background
    #[error("dispatcher '{name}' did not finish draining within {waited_ms}ms")]
    ShutdownTimeout { name: String, waited_ms: u64 },

    /// The loop task panicked or was aborted
    #[error("dispatcher '{name}' task failed: {message}")]
    TaskFailed { name: String, message: String },

    /// Invalid configuration or sink error (from contract)
    #[error("contract error: {0}")]
    Contract(#[from] contracts::ContractError),
}

impl DispatcherError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Errors returned synchronously to producers by `submit`
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The point could not be encoded; nothing was enqueued
    #[error("point rejected: {0}")]
    Encoding(#[from] EncodeError),

    /// Channel full - point rejected
    #[error("buffer full for sink '{sink_name}', point rejected")]
    BufferFull { sink_name: String },

    /// Dispatcher is draining or terminated
    #[error("dispatcher for sink '{sink_name}' is shut down, point rejected")]
    Closed { sink_name: String },
}
