//! Request tracing pipeline.
//!
//! Per request, in order:
//! 1. derive the endpoint key from the path
//! 2. resolve the endpoint config (failure: forward untraced and unlimited)
//! 3. reconcile the endpoint's schedule triggers
//! 4. gate: 503 when disabled, 429 when over the limit (handler never runs)
//! 5. decide whether tracing is on
//! 6. run the handler, inside a capture scope when tracing
//! 7. when the response body completes, ship the trace in the background

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    middleware::{self, Next},
    response::Response,
    Router,
};

use crate::capture::CaptureHandle;
use crate::config::{CacheConfig, RemoteConfig};
use crate::control::{ConfigResolver, ControlClient};
use crate::http::body::{PendingTrace, TracedBody};
use crate::http::endpoint::endpoint_key;
use crate::observability::metrics;
use crate::remote::{Remote, RemoteError};
use crate::report::TraceReporter;
use crate::schedule::ScheduleController;
use crate::security::{tracer_enabled, AccessGate, GateDecision};

/// Shared state of the pipeline. Cheap to clone.
#[derive(Clone)]
pub struct TracerState {
    pub resolver: Arc<ConfigResolver>,
    pub schedule: Arc<ScheduleController>,
    pub gate: Arc<AccessGate>,
    pub reporter: TraceReporter,
}

impl TracerState {
    pub fn new(remote: &RemoteConfig, cache: &CacheConfig) -> Result<Self, RemoteError> {
        let remote = Remote::new(remote)?;
        Ok(Self {
            resolver: Arc::new(ConfigResolver::new(
                ControlClient::new(remote.clone()),
                Duration::from_secs(cache.ttl_secs),
            )),
            schedule: Arc::new(ScheduleController::new()),
            gate: Arc::new(AccessGate::new()),
            reporter: TraceReporter::new(remote),
        })
    }
}

/// Mount the pipeline in front of every route of `router`.
pub fn attach<S>(router: Router<S>, state: TracerState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(state, tracer_middleware))
}

pub async fn tracer_middleware(
    State(state): State<TracerState>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let key = endpoint_key(request.uri().path());

    let config = match state.resolver.resolve(&key).await {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(endpoint = %key, error = %e, "Couldn't fetch control data");
            metrics::record_control_failure("fetch");
            metrics::record_request("degraded");
            return next.run(request).await;
        }
    };

    state.schedule.reconcile(&key, &config);

    let client = client_key(&request);
    let rate_limit = match state.gate.check(&key, &config, &client) {
        GateDecision::Admitted { rate_limit } => rate_limit,
        GateDecision::Rejected(response) => {
            metrics::record_request("rejected");
            return response;
        }
    };

    if !tracer_enabled(&config) {
        metrics::record_request("untraced");
        let mut response = next.run(request).await;
        if let Some(rate_limit) = rate_limit {
            rate_limit.apply_headers(response.headers_mut());
        }
        return response;
    }

    let method = request.method().to_string();
    let endpoint = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let capture = CaptureHandle::begin(method.clone(), endpoint.clone());
    let mut response = capture.scope(next.run(request)).await;
    if let Some(rate_limit) = rate_limit {
        rate_limit.apply_headers(response.headers_mut());
    }
    metrics::record_request("traced");

    let (parts, body) = response.into_parts();
    let pending = PendingTrace {
        capture,
        reporter: state.reporter.clone(),
        method,
        endpoint,
        status: parts.status.as_u16(),
        started,
    };
    Response::from_parts(parts, Body::new(TracedBody::new(body, pending)))
}

/// Rate limit key for the caller: peer IP when the server exposes it.
fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
