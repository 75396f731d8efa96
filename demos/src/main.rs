//! # Line Dispatch Demo
//!
//! Simulates a small service reporting request latency and errors.
//!
//! Writes to InfluxDB when `--url` (or `INFLUX_WRITE_URL`) is set, otherwise
//! to a [`LogSink`] so the batches show up in the logs.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::json;
use tracing::{info, warn};

use contracts::{DispatcherConfig, ValueMap};
use dispatcher::{Dispatcher, LogSink, SubmitError};
use observability::{LogFormat, ObservabilityConfig};
use reporter::{ErrorReporter, Metric};

#[derive(Parser, Debug)]
#[command(name = "line-dispatch-demo", version, about)]
struct Cli {
    /// InfluxDB write endpoint, e.g. http://localhost:8086/write?db=telemetry
    #[arg(long, env = "INFLUX_WRITE_URL")]
    url: Option<String>,

    /// Value of the hostname tag
    #[arg(long, default_value = "demo-host")]
    hostname: String,

    /// Number of simulated requests
    #[arg(long, default_value_t = 50)]
    requests: u32,

    /// Timer flush period
    #[arg(long, default_value_t = 200)]
    flush_interval_ms: u64,

    /// How long shutdown may wait for the final flush
    #[arg(long, default_value_t = 5000)]
    deadline_ms: u64,

    #[arg(long, value_enum, default_value_t = Format::Compact)]
    log_format: Format,

    /// Expose Prometheus metrics on this port
    #[arg(long)]
    metrics_port: Option<u16>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Pretty,
    Compact,
}

impl From<Format> for LogFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => LogFormat::Json,
            Format::Pretty => LogFormat::Pretty,
            Format::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: cli.metrics_port,
        ..Default::default()
    })?;

    let dispatcher = start_dispatcher(&cli)?;
    info!(sink = dispatcher.name(), "Demo starting");

    tokio::select! {
        result = simulate(&dispatcher, &cli) => result?,
        _ = tokio::signal::ctrl_c() => warn!("Interrupted, shutting down"),
    }

    let handle = dispatcher.handle();
    dispatcher
        .finalize_with_deadline(Duration::from_millis(cli.deadline_ms))
        .await
        .context("Dispatcher did not shut down cleanly")?;

    let metrics = handle.metrics();
    info!(
        flushes = metrics.flush_count,
        failures = metrics.failure_count,
        written = metrics.written_count,
        rejected = metrics.rejected_count,
        "Demo finished"
    );
    Ok(())
}

fn start_dispatcher(cli: &Cli) -> Result<Dispatcher> {
    let url = cli
        .url
        .clone()
        .unwrap_or_else(|| "http://localhost:8086/write?db=demo".to_string());
    let config = DispatcherConfig {
        flush_interval_ms: cli.flush_interval_ms,
        ..DispatcherConfig::with_url(url)
    };

    let dispatcher = if cli.url.is_some() {
        Dispatcher::connect(&config)?
    } else {
        Dispatcher::spawn(&config, LogSink::new("log"))?
    };
    Ok(dispatcher)
}

async fn simulate(dispatcher: &Dispatcher, cli: &Cli) -> Result<()> {
    let latency = Metric::from_json(
        dispatcher.handle(),
        "request_latency",
        &cli.hostname,
        &json!({"service": "checkout", "region": "eu-west"}),
        &json!({"version": "1.4.2"}),
    )?;
    let errors = ErrorReporter::new(
        dispatcher.handle(),
        &cli.hostname,
        ValueMap::new(),
        ValueMap::new(),
    );

    for request in 0..cli.requests {
        let start = Instant::now();
        tokio::time::sleep(Duration::from_millis(5 + u64::from(request % 4) * 10)).await;

        let mut outcomes = vec![latency.write_time(start)];
        if request % 7 == 6 {
            outcomes.push(errors.report("upstream_timeout"));
        }

        for outcome in outcomes {
            match outcome {
                Ok(()) => {}
                Err(SubmitError::BufferFull { .. }) => warn!(request, "Buffer full, point dropped"),
                Err(e) => return Err(e.into()),
            }
        }
    }

    info!(requests = cli.requests, "Simulation complete");
    Ok(())
}
