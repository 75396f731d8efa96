//! HttpSink - POSTs batches to an InfluxDB `/write` endpoint

use contracts::{ContractError, DispatcherConfig, LineSink};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tracing::{debug, instrument};

/// Content type of a line protocol body
pub const LINE_PROTOCOL_CONTENT_TYPE: &str = "text/line-protocol";

/// Longest response excerpt kept in error messages
const MAX_ERROR_BODY: usize = 256;

/// Sink that writes batches over HTTP
///
/// Each sink owns its own client, with a fixed request timeout.
#[derive(Debug)]
pub struct HttpSink {
    name: String,
    client: Client,
    url: Url,
}

impl HttpSink {
    /// Name used by [`HttpSink::from_config`]
    pub const DEFAULT_NAME: &'static str = "influx";

    /// Create a new HttpSink
    pub fn new(
        name: impl Into<String>,
        write_url: &str,
        timeout: Duration,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let url = Url::parse(write_url).map_err(|e| {
            ContractError::sink_connection(&name, format!("invalid url '{write_url}': {e}"))
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ContractError::sink_connection(&name, e.to_string()))?;

        debug!(sink = %name, url = %url, "HttpSink created");

        Ok(Self { name, client, url })
    }

    /// Create from dispatcher config (for `Dispatcher::connect`)
    pub fn from_config(config: &DispatcherConfig) -> Result<Self, ContractError> {
        Self::new(
            Self::DEFAULT_NAME,
            &config.write_url,
            config.request_timeout(),
        )
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn status_error(&self, status: StatusCode, body: &str) -> ContractError {
        let mut excerpt: String = body.chars().take(MAX_ERROR_BODY).collect();
        if excerpt.len() < body.len() {
            excerpt.push_str("...");
        }
        ContractError::sink_write(
            &self.name,
            format!("unexpected status {status}: {}", excerpt.trim()),
        )
    }
}

impl LineSink for HttpSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "http_sink_write",
        skip(self, body),
        fields(sink = %self.name, bytes = body.len())
    )]
    async fn write(&mut self, body: &str) -> Result<(), ContractError> {
        let response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, LINE_PROTOCOL_CONTENT_TYPE)
            .body(body.to_owned())
            .send()
            .await
            .map_err(|e| ContractError::sink_write(&self.name, format!("transport error: {e}")))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        Err(self.status_error(status, &detail))
    }

    #[instrument(name = "http_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(sink = %self.name, "HttpSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_sink_from_config() {
        let config = DispatcherConfig::for_database("127.0.0.1", "telemetry");
        let sink = HttpSink::from_config(&config).unwrap();
        assert_eq!(sink.name(), "influx");
        assert_eq!(sink.url().port(), Some(8086));
        assert_eq!(sink.url().query(), Some("db=telemetry"));
    }

    #[test]
    fn test_http_sink_rejects_invalid_url() {
        let err = HttpSink::new("bad", "://nope", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ContractError::SinkConnection { .. }));
    }

    #[test]
    fn test_status_error_truncates_body() {
        let sink = HttpSink::new("t", "http://localhost/write", Duration::from_secs(1)).unwrap();
        let body = "x".repeat(1000);
        let err = sink.status_error(StatusCode::INTERNAL_SERVER_ERROR, &body);
        let message = err.to_string();
        assert!(message.contains("500"));
        assert!(message.ends_with("..."));
        assert!(message.len() < 400);
    }

    #[tokio::test]
    async fn test_http_sink_unreachable_is_write_error() {
        // Port 9 (discard) on localhost is almost never listening
        let mut sink =
            HttpSink::new("t", "http://127.0.0.1:9/write", Duration::from_millis(500)).unwrap();
        let err = sink.write("m v=1i 0").await.unwrap_err();
        assert!(matches!(err, ContractError::SinkWrite { .. }));
    }
}
