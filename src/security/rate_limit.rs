//! Endpoint-scoped rate limiting.
//!
//! Each endpoint key owns one [`EndpointLimiter`], created the first time a
//! request needs limiting and kept for the life of the process. Inside a
//! limiter, every client gets a fixed window of `window` length allowing
//! `max_requests` hits.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::{
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use serde_json::json;

use crate::control::LimitPolicy;

/// Message returned with every 429.
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests from this IP. Please try again later.";

/// Client windows are swept once a limiter tracks this many clients.
const SWEEP_THRESHOLD: usize = 4096;

const RATELIMIT_POLICY: HeaderName = HeaderName::from_static("ratelimit-policy");
const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

struct ClientWindow {
    hits: u32,
    resets_at: Instant,
}

/// Outcome of counting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: Duration,
    pub window: Duration,
}

impl RateLimitDecision {
    /// Add the standard `RateLimit-*` headers.
    pub fn apply_headers(&self, headers: &mut HeaderMap) {
        if let Ok(policy) = HeaderValue::from_str(&format!("{};w={}", self.limit, self.window.as_secs())) {
            headers.insert(RATELIMIT_POLICY, policy);
        }
        headers.insert(RATELIMIT_LIMIT, HeaderValue::from(self.limit));
        headers.insert(RATELIMIT_REMAINING, HeaderValue::from(self.remaining));
        headers.insert(RATELIMIT_RESET, HeaderValue::from(ceil_secs(self.reset_after)));
    }

    /// The 429 response for a refused request.
    pub fn rejection(&self) -> Response {
        let body = json!({
            "status": "error",
            "message": RATE_LIMITED_MESSAGE,
        });
        let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
        self.apply_headers(response.headers_mut());
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(ceil_secs(self.reset_after)));
        response
    }
}

fn ceil_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

/// Fixed-window limiter for one endpoint.
pub struct EndpointLimiter {
    window: Duration,
    max_requests: u32,
    clients: Mutex<HashMap<String, ClientWindow>>,
}

impl EndpointLimiter {
    pub fn new(policy: &LimitPolicy) -> Self {
        Self {
            window: policy.window(),
            max_requests: policy.max_requests(),
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Whether this limiter was built from an equivalent policy.
    pub fn matches(&self, policy: &LimitPolicy) -> bool {
        self.window == policy.window() && self.max_requests == policy.max_requests()
    }

    /// Count a request from `client` now.
    pub fn check(&self, client: &str) -> RateLimitDecision {
        self.check_at(client, Instant::now())
    }

    /// Count a request from `client` at `now`.
    pub fn check_at(&self, client: &str, now: Instant) -> RateLimitDecision {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);

        if clients.len() >= SWEEP_THRESHOLD {
            clients.retain(|_, w| w.resets_at > now);
        }

        let window = clients
            .entry(client.to_string())
            .or_insert_with(|| ClientWindow {
                hits: 0,
                resets_at: now + self.window,
            });

        if now >= window.resets_at {
            window.hits = 0;
            window.resets_at = now + self.window;
        }
        window.hits = window.hits.saturating_add(1);

        RateLimitDecision {
            allowed: window.hits <= self.max_requests,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(window.hits),
            reset_after: window.resets_at.saturating_duration_since(now),
            window: self.window,
        }
    }
}

/// Process-wide limiters keyed by endpoint.
#[derive(Default)]
pub struct LimiterRegistry {
    limiters: DashMap<String, Arc<EndpointLimiter>>,
}

impl LimiterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The limiter for `endpoint_key`, built from `policy` if none exists yet.
    ///
    /// An existing limiter keeps the policy it was created with.
    pub fn get_or_create(&self, endpoint_key: &str, policy: &LimitPolicy) -> Arc<EndpointLimiter> {
        let limiter = self
            .limiters
            .entry(endpoint_key.to_string())
            .or_insert_with(|| {
                tracing::debug!(
                    endpoint = %endpoint_key,
                    window_minutes = policy.window_minutes(),
                    max_requests = policy.max_requests(),
                    "Creating rate limiter"
                );
                Arc::new(EndpointLimiter::new(policy))
            })
            .clone();

        if !limiter.matches(policy) {
            tracing::debug!(endpoint = %endpoint_key, "Limit policy changed; existing limiter keeps its first policy");
        }
        limiter
    }

    pub fn len(&self) -> usize {
        self.limiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limiters.is_empty()
    }
}
