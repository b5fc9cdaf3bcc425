//! # Integration Tests
//!
//! Integration and end-to-end tests.
//!
//! Covers:
//! - Manifest file -> job source -> dispatcher -> sinks
//! - Real HTTP fetching against local mock servers
//! - Deadline, cancellation and concurrency-cap behaviour across crates

#[cfg(test)]
mod contract_tests {
    use contracts::{DispatchConfig, SessionReport, TimeoutPolicy};
    use std::time::Duration;

    #[test]
    fn test_dispatch_defaults() {
        let config = DispatchConfig::default();
        assert_eq!(config.on_timeout, TimeoutPolicy::Detach);
        assert_eq!(config.max_in_flight, None);
        assert!(config.timeout_ms > 0);
        assert!(config_loader::validate_dispatch(&config).is_ok());
    }

    #[test]
    fn test_report_abandoned_jobs() {
        let report = SessionReport {
            dispatched: 3,
            delivered: 1,
            succeeded: 1,
            failed: 0,
            bytes: 10,
            timed_out: true,
            cancelled: 0,
            sink_failures: 0,
            elapsed: Duration::from_secs(1),
        };
        assert_eq!(report.abandoned(), 2);
        assert!(!report.is_complete());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;
    use std::time::Duration;

    use config_loader::ConfigLoader;
    use contracts::{DispatchConfig, JobDescriptor, Notification, TimeoutPolicy};
    use dispatcher::{collect_jobs, Dispatcher, MemorySink, ReportSink, Tee};
    use fetcher::HttpFetcher;
    use tempfile::{NamedTempFile, TempDir};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Server with a fast and a slow endpoint
    async fn fast_and_slow_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fast"))
            .respond_with(ResponseTemplate::new(200).set_body_string("a".repeat(2048)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("b".repeat(512))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;
        server
    }

    fn unreachable_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/")
    }

    /// End-to-end: fast job delivered, slow job cut off by the deadline
    #[tokio::test]
    async fn test_e2e_fast_then_timeout() {
        let server = fast_and_slow_server().await;
        let jobs = vec![
            JobDescriptor::new("A", format!("{}/fast", server.uri())),
            JobDescriptor::new("B", format!("{}/slow", server.uri())),
        ];

        let dispatcher = Dispatcher::new(
            HttpFetcher::new().unwrap(),
            DispatchConfig::with_timeout(Duration::from_millis(1000)),
        );
        let mut sink = MemorySink::new("memory");
        let report = dispatcher.dispatch_and_collect(jobs, &mut sink).await;

        let notifications = sink.notifications();
        assert_eq!(notifications.len(), 2);
        let first = notifications[0].outcome().unwrap();
        assert_eq!(first.name(), "A");
        assert_eq!(first.byte_count(), 2048);
        assert_eq!(notifications[1], Notification::TimedOut);

        assert!(report.timed_out);
        assert_eq!(report.abandoned(), 1);
        assert!(report.elapsed < Duration::from_secs(5));
    }

    /// End-to-end: manifest file on disk drives a complete run
    #[tokio::test]
    async fn test_e2e_manifest_run() {
        let server = fast_and_slow_server().await;

        let mut manifest = NamedTempFile::with_suffix(".toml").unwrap();
        write!(
            manifest,
            r#"
[dispatch]
timeout_ms = 3000
max_in_flight = 2

[[jobs]]
name = "fast-1"
year = 2009
url = "{uri}/fast"

[[jobs]]
name = "fast-2"
url = "{uri}/fast"

[[jobs]]
name = "gone"
url = "{gone}"
"#,
            uri = server.uri(),
            gone = unreachable_url(),
        )
        .unwrap();

        let loaded = ConfigLoader::load_from_path(manifest.path()).unwrap();
        assert_eq!(loaded.dispatch.max_in_flight, Some(2));

        let dispatcher = Dispatcher::new(HttpFetcher::new().unwrap(), loaded.dispatch.clone());
        let mut sink = MemorySink::new("memory");
        let report = dispatcher
            .dispatch_and_collect(loaded.descriptors(), &mut sink)
            .await;

        assert!(report.is_complete());
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.bytes, 4096);

        let failure = sink.outcomes().find(|o| !o.is_success()).unwrap();
        assert_eq!(failure.name(), "gone");
        assert_eq!(sink.timed_out_count(), 0);
    }

    /// End-to-end: JSON-lines record stream with capitalised keys
    #[tokio::test]
    async fn test_e2e_record_stream() {
        let server = fast_and_slow_server().await;

        let mut file = NamedTempFile::with_suffix(".jsonl").unwrap();
        for name in ["Python", "Ruby", "Go"] {
            writeln!(
                file,
                r#"{{"Name": "{name}", "Year": 2000, "URL": "{}/fast"}}"#,
                server.uri()
            )
            .unwrap();
        }

        let mut source = ConfigLoader::open_record_stream(file.path()).unwrap();
        let jobs = collect_jobs(&mut source).unwrap();
        assert_eq!(jobs.len(), 3);

        let dispatcher = Dispatcher::new(HttpFetcher::new().unwrap(), DispatchConfig::default());
        let mut sink = MemorySink::new("memory");
        let report = dispatcher.dispatch_and_collect(jobs, &mut sink).await;

        let mut names = sink.outcome_names();
        names.sort();
        assert_eq!(names, vec!["Go", "Python", "Ruby"]);
        assert!(report.is_complete());
    }

    /// Malformed manifest: nothing is fetched
    #[tokio::test]
    async fn test_e2e_malformed_stream_fetches_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut file = NamedTempFile::with_suffix(".jsonl").unwrap();
        writeln!(file, r#"{{"Name": "ok", "URL": "{}/"}}"#, server.uri()).unwrap();
        writeln!(file, r#"{{"Name": "broken", "URL": }}"#).unwrap();

        let dispatcher = Dispatcher::new(HttpFetcher::new().unwrap(), DispatchConfig::default());
        let mut source = ConfigLoader::open_record_stream(file.path()).unwrap();
        let mut sink = MemorySink::new("memory");

        let result = dispatcher.run_source(&mut source, &mut sink).await;
        assert!(result.is_err());
        assert!(sink.notifications().is_empty());
    }

    /// Cancel policy returns promptly and still reports the sentinel
    #[tokio::test]
    async fn test_e2e_cancel_policy() {
        let server = fast_and_slow_server().await;
        let jobs = vec![
            JobDescriptor::new("slow-1", format!("{}/slow", server.uri())),
            JobDescriptor::new("slow-2", format!("{}/slow", server.uri())),
        ];

        let dispatcher = Dispatcher::new(
            HttpFetcher::new().unwrap(),
            DispatchConfig::with_timeout(Duration::from_millis(300))
                .on_timeout(TimeoutPolicy::Cancel),
        );
        let mut sink = MemorySink::new("memory");
        let started = std::time::Instant::now();
        let report = dispatcher.dispatch_and_collect(jobs, &mut sink).await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(sink.notifications(), &[Notification::TimedOut]);
        assert_eq!(report.cancelled, 2);
    }

    /// Report sink and memory sink see the same notifications
    #[tokio::test]
    async fn test_e2e_report_file() {
        let server = fast_and_slow_server().await;
        let dir = TempDir::new().unwrap();
        let report_path = dir.path().join("report.jsonl");

        let jobs = vec![
            JobDescriptor::new("A", format!("{}/fast", server.uri())),
            JobDescriptor::new("B", format!("{}/slow", server.uri())),
        ];
        let dispatcher = Dispatcher::new(
            HttpFetcher::new().unwrap(),
            DispatchConfig::with_timeout(Duration::from_millis(500)),
        );
        let mut sink = Tee::new(
            MemorySink::new("memory"),
            ReportSink::create(&report_path).unwrap(),
        );
        dispatcher.dispatch_and_collect(jobs, &mut sink).await;

        let (memory, _) = sink.into_parts();
        let content = std::fs::read_to_string(&report_path).unwrap();
        let kinds: Vec<String> = content
            .lines()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).unwrap();
                value["kind"].as_str().unwrap().to_string()
            })
            .collect();

        assert_eq!(kinds, vec!["success", "timed_out"]);
        assert_eq!(memory.notifications().len(), 2);
    }
}

#[cfg(test)]
mod mode_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::JobDescriptor;
    use dispatcher::{run_detached, run_sequential, MemorySink};
    use fetcher::{MockFetcher, MockRoute};
    use tokio::sync::Mutex;

    fn languages() -> (MockFetcher, Vec<JobDescriptor>) {
        let fetcher = MockFetcher::with_routes([
            ("mock://python", MockRoute::ok(300).with_latency(Duration::from_millis(300))),
            ("mock://ruby", MockRoute::ok(200).with_latency(Duration::from_millis(200))),
            ("mock://go", MockRoute::ok(100).with_latency(Duration::from_millis(100))),
        ]);
        let jobs = ["python", "ruby", "go"]
            .into_iter()
            .map(|name| JobDescriptor::new(name, format!("mock://{name}")))
            .collect();
        (fetcher, jobs)
    }

    /// Sequential run takes the sum of latencies, detached the maximum
    #[tokio::test(start_paused = true)]
    async fn test_modes_timing() {
        let (fetcher, jobs) = languages();

        let mut sink = MemorySink::new("sequential");
        let sequential = run_sequential(&fetcher, &jobs, &mut sink).await;
        assert!(sequential.elapsed >= Duration::from_millis(600));
        assert_eq!(sink.outcome_names(), vec!["python", "ruby", "go"]);

        let shared = Arc::new(Mutex::new(MemorySink::new("detached")));
        let detached = run_detached(
            Arc::new(fetcher),
            jobs,
            Duration::from_secs(10),
            Arc::clone(&shared),
        )
        .await;
        assert!(detached.elapsed < Duration::from_millis(600));
        assert_eq!(shared.lock().await.outcome_names(), vec!["go", "ruby", "python"]);
        assert_eq!(sequential.bytes, detached.bytes);
    }
}
