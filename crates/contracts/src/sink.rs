//! LineSink trait - Dispatcher output interface
//!
//! Defines the abstract destination of flushed batches.

use crate::ContractError;

/// Batch output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(LineSink: Send)]
pub trait LocalLineSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one batch body (newline-joined lines)
    ///
    /// # Errors
    /// Returns a write error when the destination did not acknowledge the batch.
    /// The caller keeps the batch and retries later.
    async fn write(&mut self, body: &str) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
