//! Per-endpoint access gate.
//!
//! Decides whether a request may reach the upstream handler:
//! 1. `toggles.api == false` → 503, nothing else is checked
//! 2. `toggles.limit == true` → count the request against the endpoint limiter
//!
//! Also answers whether tracing is on for the request.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Local, Timelike};
use serde_json::json;

use crate::control::EndpointConfig;
use crate::observability::metrics;
use crate::schedule::window::is_active_at;
use crate::security::rate_limit::{LimiterRegistry, RateLimitDecision};

/// Error returned while an endpoint's api toggle is off.
pub const API_DISABLED_MESSAGE: &str =
    "API is temporarily disabled for this endpoint. Please try later.";

/// Result of [`AccessGate::check`].
#[derive(Debug)]
pub enum GateDecision {
    /// Go on. Carries the limiter verdict when limiting applied.
    Admitted { rate_limit: Option<RateLimitDecision> },
    /// Stop here and send this response; nothing downstream may run.
    Rejected(Response),
}

impl GateDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, GateDecision::Admitted { .. })
    }

    pub fn rejection_status(&self) -> Option<StatusCode> {
        match self {
            GateDecision::Rejected(response) => Some(response.status()),
            GateDecision::Admitted { .. } => None,
        }
    }
}

/// Api switch plus lazily created endpoint limiters.
#[derive(Default)]
pub struct AccessGate {
    limiters: LimiterRegistry,
}

impl AccessGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit or reject one request from `client` to `endpoint_key`.
    pub fn check(&self, endpoint_key: &str, config: &EndpointConfig, client: &str) -> GateDecision {
        if !config.toggles.api {
            tracing::debug!(endpoint = %endpoint_key, "Endpoint disabled");
            metrics::record_rejection("api_disabled");
            let body = json!({ "error": API_DISABLED_MESSAGE });
            return GateDecision::Rejected((StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response());
        }

        if !config.toggles.limit {
            return GateDecision::Admitted { rate_limit: None };
        }

        let decision = self
            .limiters
            .get_or_create(endpoint_key, &config.limit_policy)
            .check(client);

        if decision.allowed {
            GateDecision::Admitted {
                rate_limit: Some(decision),
            }
        } else {
            tracing::warn!(endpoint = %endpoint_key, client = %client, "Rate limit exceeded");
            metrics::record_rejection("rate_limited");
            GateDecision::Rejected(decision.rejection())
        }
    }

    pub fn limiters(&self) -> &LimiterRegistry {
        &self.limiters
    }
}

/// Whether requests to this endpoint are traced right now.
pub fn tracer_enabled(config: &EndpointConfig) -> bool {
    let now = Local::now();
    tracer_enabled_at(config, now.hour() * 60 + now.minute())
}

/// [`tracer_enabled`] at a given minute of the day.
pub fn tracer_enabled_at(config: &EndpointConfig, now_minutes: u32) -> bool {
    if config.toggles.tracer {
        return true;
    }
    if !config.toggles.schedule {
        return false;
    }
    match config.schedule_policy.bounds() {
        Some((start, end)) => is_active_at(Some(start), Some(end), now_minutes),
        None => false,
    }
}
