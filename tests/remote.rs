//! Control store and trace collector clients against the mock service.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;

use trace_gate::control::{ConfigResolver, ControlClient, ControlError, Toggles};
use trace_gate::remote::Remote;
use trace_gate::report::{ReportError, TraceRecord, TraceReporter};

mod common;

use common::{entry, remote_config, start_mock_remote, MockRemote};

async fn remote_for(mock: &MockRemote) -> Remote {
    let addr = start_mock_remote(mock.clone()).await;
    Remote::new(&remote_config(addr)).unwrap()
}

#[tokio::test]
async fn test_failed_persist_still_returns_default() {
    let mock = MockRemote::default();
    mock.fail_put.store(true, Ordering::SeqCst);
    let resolver = ConfigResolver::new(ControlClient::new(remote_for(&mock).await), Duration::ZERO);

    let config = resolver.resolve("/users/profile").await.unwrap();
    assert_eq!(config.endpoint_key, "/users/profile");
    assert!(config.toggles.api);
    assert!(config.toggles.tracer);
    assert!(mock.puts().is_empty());
}

#[tokio::test]
async fn test_resolve_reads_stored_entry() {
    let mock = MockRemote::with_entries(vec![
        entry(
            "/orders/list",
            json!({ "api": true, "tracer": false, "limit": true, "schedule": false }),
            json!({ "rate": 5, "number": 50 }),
            json!({ "start": null, "end": null }),
        ),
        entry(
            "/users/profile",
            json!({ "api": false, "tracer": false, "limit": false, "schedule": true }),
            json!({ "rate": null, "number": null }),
            json!({ "start": "09:00", "end": "17:00" }),
        ),
    ]);
    let resolver = ConfigResolver::new(ControlClient::new(remote_for(&mock).await), Duration::ZERO);

    let config = resolver.resolve("/users/profile").await.unwrap();
    assert_eq!(
        config.toggles,
        Toggles {
            api: false,
            tracer: false,
            limit: false,
            schedule: true,
        }
    );
    assert_eq!(config.schedule_policy.bounds(), Some(("09:00", "17:00")));
    assert!(mock.puts().is_empty());
    assert_eq!(resolver.cached_len(), 0);
}

#[tokio::test]
async fn test_store_error_is_reported() {
    let mock = MockRemote::default();
    mock.fail_control.store(true, Ordering::SeqCst);
    let client = ControlClient::new(remote_for(&mock).await);

    match client.fetch_all().await {
        Err(ControlError::Status(status)) => assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR),
        other => panic!("expected status error, got {:?}", other.map(|c| c.len())),
    }
}

#[tokio::test]
async fn test_empty_store_lists_nothing() {
    let mock = MockRemote::default();
    let client = ControlClient::new(remote_for(&mock).await);
    assert!(client.fetch_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deliver_posts_record() {
    let mock = MockRemote::default();
    let reporter = TraceReporter::new(remote_for(&mock).await);

    let record = TraceRecord::new("POST".into(), "/orders/create".into(), 201, 12, Vec::new());
    reporter.deliver(&record).await.unwrap();

    let traces = mock.traces();
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0]["traceId"], record.trace_id.as_str());
    assert_eq!(traces[0]["responseTimeMs"], 12);
}

#[tokio::test]
async fn test_deliver_surfaces_collector_rejection() {
    let mock = MockRemote::default();
    mock.fail_logs.store(true, Ordering::SeqCst);
    let reporter = TraceReporter::new(remote_for(&mock).await);

    let record = TraceRecord::new("GET".into(), "/orders/list".into(), 200, 3, Vec::new());
    match reporter.deliver(&record).await {
        Err(ReportError::Rejected { status, body }) => {
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(body, "collector down");
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_wrong_credential_is_rejected() {
    let mock = MockRemote::default();
    let addr = start_mock_remote(mock.clone()).await;
    let mut config = remote_config(addr);
    config.api_key = "wrong".into();
    let client = ControlClient::new(Remote::new(&config).unwrap());

    assert!(matches!(
        client.fetch_all().await,
        Err(ControlError::Status(status)) if status == StatusCode::UNAUTHORIZED
    ));
}

async fn resolve_concurrently(resolver: Arc<ConfigResolver>, key: &'static str, count: usize) {
    let tasks: Vec<_> = (0..count)
        .map(|_| {
            let resolver = resolver.clone();
            tokio::spawn(async move { resolver.resolve(key).await.unwrap() })
        })
        .collect();
    for task in tasks {
        let config = task.await.unwrap();
        assert_eq!(config.endpoint_key, key);
        assert!(config.toggles.api);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_first_requests_register_once_with_cache() {
    let mock = MockRemote::default();
    let resolver = Arc::new(ConfigResolver::new(
        ControlClient::new(remote_for(&mock).await),
        Duration::from_secs(60),
    ));

    resolve_concurrently(resolver.clone(), "/users/new", 8).await;

    assert_eq!(mock.puts().len(), 1);
    assert_eq!(mock.fetches.load(Ordering::SeqCst), 1);
    assert_eq!(resolver.cached_len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_first_requests_register_once_without_cache() {
    let mock = MockRemote::default();
    let resolver = Arc::new(ConfigResolver::new(
        ControlClient::new(remote_for(&mock).await),
        Duration::ZERO,
    ));

    resolve_concurrently(resolver, "/users/new", 8).await;

    assert_eq!(mock.puts().len(), 1);
}

#[tokio::test]
async fn test_malformed_requested_entry_is_an_error() {
    let mock = MockRemote::with_entries(vec![entry(
        "/orders/list",
        json!({ "api": "no" }),
        json!({ "rate": null, "number": null }),
        json!({ "start": null, "end": null }),
    )]);
    let resolver = ConfigResolver::new(ControlClient::new(remote_for(&mock).await), Duration::ZERO);

    assert!(matches!(
        resolver.resolve("/orders/list").await,
        Err(ControlError::InvalidEntry { ref endpoint, .. }) if endpoint == "/orders/list"
    ));
    assert!(mock.puts().is_empty(), "a stored entry must never be overwritten with defaults");
}
