//! DispatcherConfig - per-destination dispatcher settings
//!
//! Serializable so it can be embedded in a host application's own configuration.
//!
//! Validation rules:
//! - write_url is an http(s) URL
//! - queue_capacity > 0
//! - max_batch_size > 0
//! - flush_interval_ms > 0
//! - request_timeout_ms > 0

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ContractError;

/// Default bounded channel capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Default batch size that triggers an immediate flush
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1024;

/// Default flush timer period
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 1000;

/// Default HTTP request timeout
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;

/// Default InfluxDB HTTP port
pub const DEFAULT_PORT: u16 = 8086;

/// Dispatcher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Full write endpoint, e.g. `http://db:8086/write?db=telemetry`
    pub write_url: String,

    /// Capacity of the producer channel
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Batch length that triggers an immediate flush
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Timer flush period (milliseconds)
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    /// Transport timeout for one flush (milliseconds)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_max_batch_size() -> usize {
    DEFAULT_MAX_BATCH_SIZE
}

fn default_flush_interval_ms() -> u64 {
    DEFAULT_FLUSH_INTERVAL_MS
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

impl DispatcherConfig {
    /// Config for a raw write endpoint URL
    pub fn with_url(write_url: impl Into<String>) -> Self {
        Self {
            write_url: write_url.into(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }

    /// Config for a database on an InfluxDB host (default port)
    pub fn for_database(host: &str, database: &str) -> Self {
        Self::with_url(format!(
            "http://{host}:{DEFAULT_PORT}/write?db={database}"
        ))
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Validate the configuration
    ///
    /// Returns the first error encountered, or Ok(()).
    pub fn validate(&self) -> Result<(), ContractError> {
        self.validate_write_url()?;
        validate_non_zero("queue_capacity", self.queue_capacity as u64)?;
        validate_non_zero("max_batch_size", self.max_batch_size as u64)?;
        validate_non_zero("flush_interval_ms", self.flush_interval_ms)?;
        validate_non_zero("request_timeout_ms", self.request_timeout_ms)?;
        Ok(())
    }

    fn validate_write_url(&self) -> Result<(), ContractError> {
        let url = self.write_url.trim();
        if url.is_empty() {
            return Err(ContractError::config_validation(
                "write_url",
                "write_url cannot be empty",
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ContractError::config_validation(
                "write_url",
                format!("unsupported scheme in '{url}', expected http or https"),
            ));
        }
        Ok(())
    }
}

fn validate_non_zero(field: &str, value: u64) -> Result<(), ContractError> {
    if value == 0 {
        return Err(ContractError::config_validation(
            field,
            format!("{field} must be > 0"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_database_url() {
        let config = DispatcherConfig::for_database("influx.local", "telemetry");
        assert_eq!(
            config.write_url,
            "http://influx.local:8086/write?db=telemetry"
        );
        assert_eq!(config.max_batch_size, 1024);
        assert_eq!(config.flush_interval(), Duration::from_secs(1));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let config: DispatcherConfig =
            serde_json::from_str(r#"{"write_url":"http://localhost:8086/write?db=x"}"#).unwrap();
        assert_eq!(config, DispatcherConfig::with_url("http://localhost:8086/write?db=x"));
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let config = DispatcherConfig::with_url("udp://localhost:8089");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { ref field, .. } if field == "write_url"));
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let mut config = DispatcherConfig::with_url("http://localhost:8086/write?db=x");
        config.max_batch_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_batch_size"));
    }
}
