//! LogSink - logs batch summaries via tracing
//!
//! Always acknowledges; useful when no database is reachable.

use contracts::{ContractError, LineSink};
use tracing::{debug, info, instrument};

/// Sink that logs batch summaries for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_batch_summary(&self, body: &str) {
        let lines = body.lines().count();
        info!(
            sink = %self.name,
            lines,
            bytes = body.len(),
            first = body.lines().next().unwrap_or_default(),
            "Batch received"
        );
        for line in body.lines() {
            debug!(sink = %self.name, line, "Line");
        }
    }
}

impl LineSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "log_sink_write", skip(self, body), fields(sink = %self.name))]
    async fn write(&mut self, body: &str) -> Result<(), ContractError> {
        self.log_batch_summary(body);
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}
