//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use trace_gate::config::{CacheConfig, RemoteConfig};

pub const API_KEY: &str = "test-api-key";

/// In-memory stand-in for the remote control and trace services.
#[derive(Clone, Default)]
pub struct MockRemote {
    pub entries: Arc<Mutex<Vec<Value>>>,
    pub puts: Arc<Mutex<Vec<Value>>>,
    pub traces: Arc<Mutex<Vec<Value>>>,
    pub fetches: Arc<AtomicUsize>,
    pub fail_control: Arc<AtomicBool>,
    pub fail_put: Arc<AtomicBool>,
    pub fail_logs: Arc<AtomicBool>,
}

impl MockRemote {
    pub fn with_entries(entries: Vec<Value>) -> Self {
        let remote = Self::default();
        *remote.entries.lock().unwrap() = entries;
        remote
    }

    pub fn traces(&self) -> Vec<Value> {
        self.traces.lock().unwrap().clone()
    }

    pub fn puts(&self) -> Vec<Value> {
        self.puts.lock().unwrap().clone()
    }

    /// Wait until at least `count` traces arrived.
    pub async fn wait_for_traces(&self, count: usize) -> Vec<Value> {
        for _ in 0..200 {
            let traces = self.traces();
            if traces.len() >= count {
                return traces;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {} traces, got {}", count, self.traces().len());
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("x-api-key").and_then(|v| v.to_str().ok()) == Some(API_KEY)
}

async fn list_control(State(remote): State<MockRemote>, headers: HeaderMap) -> impl IntoResponse {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad key" })));
    }
    remote.fetches.fetch_add(1, Ordering::SeqCst);
    if remote.fail_control.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "db down" })));
    }
    let entries = remote.entries.lock().unwrap().clone();
    (StatusCode::OK, Json(json!({ "data": entries })))
}

async fn put_control(
    State(remote): State<MockRemote>,
    headers: HeaderMap,
    Json(entry): Json<Value>,
) -> StatusCode {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    if remote.fail_put.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    remote.puts.lock().unwrap().push(entry.clone());
    let mut entries = remote.entries.lock().unwrap();
    entries.retain(|e| e["endpoint"] != entry["endpoint"]);
    entries.push(entry);
    StatusCode::OK
}

async fn post_logs(
    State(remote): State<MockRemote>,
    headers: HeaderMap,
    Json(trace): Json<Value>,
) -> (StatusCode, &'static str) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "bad key");
    }
    if remote.fail_logs.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, "collector down");
    }
    remote.traces.lock().unwrap().push(trace);
    (StatusCode::CREATED, "stored")
}

/// Serve `remote` on an ephemeral port.
pub async fn start_mock_remote(remote: MockRemote) -> SocketAddr {
    let app = Router::new()
        .route("/control", get(list_control).put(put_control))
        .route("/logs", post(post_logs))
        .with_state(remote);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

pub fn remote_config(addr: SocketAddr) -> RemoteConfig {
    RemoteConfig {
        base_url: format!("http://{}", addr),
        api_key: API_KEY.to_string(),
        api_key_header: "x-api-key".to_string(),
        use_system_proxy: false,
    }
}

pub fn no_cache() -> CacheConfig {
    CacheConfig { ttl_secs: 0 }
}

/// A stored control entry.
pub fn entry(endpoint: &str, toggles: Value, limit: Value, schedule: Value) -> Value {
    json!({
        "endpoint": endpoint,
        "toggles": toggles,
        "limitValues": limit,
        "scheduleValues": schedule,
    })
}
