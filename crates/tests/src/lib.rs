//! # Integration Tests
//!
//! End-to-end tests against an in-process mock of the InfluxDB `/write`
//! endpoint:
//! - timer and threshold flushes over real HTTP
//! - retry of a rejected batch with an identical body
//! - finalize drain and the deadline-bounded variant
//! - reporter facades on top of the dispatcher

#[cfg(test)]
mod mock_influx {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::extract::{RawQuery, State};
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use tokio::net::TcpListener;

    /// One request seen by the mock server
    #[derive(Debug, Clone)]
    pub struct Received {
        pub query: Option<String>,
        pub content_type: Option<String>,
        pub body: String,
        pub status: StatusCode,
    }

    #[derive(Default)]
    struct MockState {
        requests: Mutex<Vec<Received>>,
        /// Reject the next N writes with 500
        failures_left: AtomicUsize,
    }

    /// Mock write endpoint bound to an ephemeral local port
    #[derive(Clone)]
    pub struct MockInflux {
        state: Arc<MockState>,
        pub base_url: String,
    }

    impl MockInflux {
        pub async fn start() -> Self {
            let state = Arc::new(MockState::default());
            let app = Router::new()
                .route("/write", post(write_handler))
                .with_state(Arc::clone(&state));

            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            Self {
                state,
                base_url: format!("http://{addr}"),
            }
        }

        pub fn write_url(&self, db: &str) -> String {
            format!("{}/write?db={db}", self.base_url)
        }

        pub fn fail_next(&self, n: usize) {
            self.state.failures_left.store(n, Ordering::SeqCst);
        }

        pub fn requests(&self) -> Vec<Received> {
            self.state.requests.lock().unwrap().clone()
        }

        /// Lines of every accepted body, in arrival order
        pub fn accepted_lines(&self) -> Vec<String> {
            self.requests()
                .iter()
                .filter(|r| r.status == StatusCode::NO_CONTENT)
                .flat_map(|r| r.body.lines().map(str::to_string).collect::<Vec<_>>())
                .collect()
        }

        /// Wait until at least `n` requests arrived
        pub async fn wait_for_requests(&self, n: usize) -> Vec<Received> {
            let wait = async {
                loop {
                    let requests = self.requests();
                    if requests.len() >= n {
                        return requests;
                    }
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            };
            tokio::time::timeout(Duration::from_secs(5), wait)
                .await
                .expect("mock server did not receive enough requests")
        }
    }

    async fn write_handler(
        State(state): State<Arc<MockState>>,
        RawQuery(query): RawQuery,
        headers: HeaderMap,
        body: String,
    ) -> (StatusCode, &'static str) {
        let reject = state
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        let (status, detail) = if reject {
            (StatusCode::INTERNAL_SERVER_ERROR, "{\"error\":\"timeout\"}")
        } else {
            (StatusCode::NO_CONTENT, "")
        };

        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        state.requests.lock().unwrap().push(Received {
            query,
            content_type,
            body,
            status,
        });

        (status, detail)
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::time::{Duration, Instant};

    use contracts::{DispatcherConfig, FieldValue, Point, ValueMap};
    use dispatcher::{
        Dispatcher, DispatcherError, DispatcherState, SubmitError, LINE_PROTOCOL_CONTENT_TYPE,
    };
    use reporter::{ErrorReporter, Metric};
    use serde_json::json;

    use crate::mock_influx::MockInflux;

    fn fast_config(url: String) -> DispatcherConfig {
        DispatcherConfig {
            flush_interval_ms: 50,
            request_timeout_ms: 1000,
            ..DispatcherConfig::with_url(url)
        }
    }

    fn cpu_point(usage: f64) -> Point {
        Point::new("cpu")
            .tag("host", "a")
            .field("usage", usage)
    }

    /// Single point: Dispatcher -> timer flush -> HTTP POST -> 204
    #[tokio::test]
    async fn test_point_delivered_on_tick() {
        let server = MockInflux::start().await;
        let dispatcher = Dispatcher::connect(&fast_config(server.write_url("telemetry"))).unwrap();

        dispatcher.submit(&cpu_point(0.5)).unwrap();
        let requests = server.wait_for_requests(1).await;

        let request = &requests[0];
        assert_eq!(request.query.as_deref(), Some("db=telemetry"));
        assert_eq!(request.content_type.as_deref(), Some(LINE_PROTOCOL_CONTENT_TYPE));
        assert!(request.body.starts_with("cpu,host=a usage=0.5 "));
        assert_eq!(request.body.lines().count(), 1);

        let parsed = line_protocol::parse_line(&request.body).unwrap();
        assert!(parsed.timestamp.is_some());

        dispatcher.finalize().await.unwrap();
        assert_eq!(server.requests().len(), 1);
    }

    /// 500 keeps the batch; the next tick resends the exact same body
    #[tokio::test]
    async fn test_rejected_batch_is_resent_unchanged() {
        let server = MockInflux::start().await;
        server.fail_next(1);
        let dispatcher = Dispatcher::connect(&fast_config(server.write_url("telemetry"))).unwrap();
        let handle = dispatcher.handle();

        for i in 0..3 {
            dispatcher.submit(&cpu_point(i as f64)).unwrap();
        }
        let requests = server.wait_for_requests(2).await;

        assert_eq!(requests[0].status.as_u16(), 500);
        assert_eq!(requests[1].status.as_u16(), 204);
        assert_eq!(requests[0].body, requests[1].body);
        assert_eq!(requests[1].body.lines().count(), 3);

        dispatcher.finalize().await.unwrap();
        assert_eq!(server.accepted_lines().len(), 3);

        let metrics = handle.metrics();
        assert_eq!(metrics.failure_count, 1);
        assert_eq!(metrics.written_count, 3);
    }

    /// With a long timer, finalize alone pushes everything out in one body
    #[tokio::test]
    async fn test_finalize_drains_queued_points() {
        let server = MockInflux::start().await;
        let config = DispatcherConfig {
            flush_interval_ms: 60_000,
            ..DispatcherConfig::with_url(server.write_url("telemetry"))
        };
        let dispatcher = Dispatcher::connect(&config).unwrap();
        let handle = dispatcher.handle();

        for i in 0..10i64 {
            handle
                .submit(&Point::new("seq").field("n", i))
                .unwrap();
        }
        assert!(server.requests().is_empty());

        dispatcher.finalize().await.unwrap();

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        let lines = server.accepted_lines();
        assert_eq!(lines.len(), 10);
        for (i, line) in lines.iter().enumerate() {
            assert!(line.starts_with(&format!("seq n={i}i ")));
        }

        assert_eq!(handle.state(), DispatcherState::Terminated);
        assert!(matches!(
            handle.submit(&Point::new("seq").field("n", 99i64)),
            Err(SubmitError::Closed { .. })
        ));
    }

    /// Reaching max_batch_size flushes without waiting for the timer
    #[tokio::test]
    async fn test_full_batch_flushes_before_tick() {
        let server = MockInflux::start().await;
        let config = DispatcherConfig {
            max_batch_size: 5,
            flush_interval_ms: 60_000,
            ..DispatcherConfig::with_url(server.write_url("telemetry"))
        };
        let dispatcher = Dispatcher::connect(&config).unwrap();

        for i in 0..5i64 {
            dispatcher.submit(&Point::new("seq").field("n", i)).unwrap();
        }
        let requests = server.wait_for_requests(1).await;
        assert_eq!(requests[0].body.lines().count(), 5);

        dispatcher.finalize().await.unwrap();
        assert_eq!(server.requests().len(), 1);
    }

    /// A server that never accepts makes the bounded finalize give up
    #[tokio::test]
    async fn test_finalize_with_deadline_times_out_while_rejected() {
        let server = MockInflux::start().await;
        server.fail_next(usize::MAX);
        let dispatcher = Dispatcher::connect(&fast_config(server.write_url("telemetry"))).unwrap();
        let handle = dispatcher.handle();

        dispatcher.submit(&cpu_point(0.1)).unwrap();
        let err = dispatcher
            .finalize_with_deadline(Duration::from_millis(300))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatcherError::ShutdownTimeout { waited_ms: 300, .. }));
        assert_eq!(handle.state(), DispatcherState::Draining);
        assert!(server.requests().len() >= 2);
        assert!(server.accepted_lines().is_empty());
    }

    /// Metric and ErrorReporter share one dispatcher
    #[tokio::test]
    async fn test_reporters_write_through_dispatcher() {
        let server = MockInflux::start().await;
        let dispatcher = Dispatcher::connect(&fast_config(server.write_url("telemetry"))).unwrap();

        let mut fields = ValueMap::new();
        fields.insert("size".to_string(), FieldValue::from(512i64));
        let latency = Metric::new(
            dispatcher.handle(),
            "request",
            "web-01",
            ValueMap::new(),
            fields,
        );
        let errors = ErrorReporter::from_json(
            dispatcher.handle(),
            "web-01",
            &json!({"service": "api"}),
            &serde_json::Value::Null,
        )
        .unwrap();

        latency
            .write_time(Instant::now() - Duration::from_millis(20))
            .unwrap();
        errors.report("db_timeout").unwrap();

        dispatcher.finalize().await.unwrap();

        let lines = server.accepted_lines();
        assert_eq!(lines.len(), 2);

        let metric = line_protocol::parse_line(&lines[0]).unwrap();
        assert_eq!(metric.measurement, "request");
        assert_eq!(metric.tags.get("type").map(String::as_str), Some("metric"));
        assert_eq!(metric.tags.get("hostname").map(String::as_str), Some("web-01"));
        assert_eq!(metric.fields.get("size"), Some(&FieldValue::Integer(512)));
        assert!(matches!(metric.fields.get("value"), Some(FieldValue::Float(v)) if *v >= 0.02));

        assert!(lines[1].starts_with("db_timeout,hostname=web-01,service=api,type=error value=1i "));
    }

    /// Unreachable endpoint: submit still succeeds, flushes fail, data is kept
    #[tokio::test]
    async fn test_unreachable_endpoint_keeps_points() {
        let config = DispatcherConfig {
            flush_interval_ms: 50,
            request_timeout_ms: 200,
            ..DispatcherConfig::with_url("http://127.0.0.1:9/write?db=telemetry")
        };
        let dispatcher = Dispatcher::connect(&config).unwrap();

        dispatcher.submit(&cpu_point(0.9)).unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;

        let metrics = dispatcher.metrics();
        assert!(metrics.failure_count >= 1);
        assert_eq!(metrics.written_count, 0);
        assert_eq!(metrics.batch_len, 1);
        assert_eq!(dispatcher.state(), DispatcherState::Running);
    }
}
