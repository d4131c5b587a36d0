//! Configuration schema definitions.
//!
//! This module defines the process configuration for the tracing gateway.
//! All types derive Serde traits for deserialization from config files.
//! Per-endpoint control settings are NOT here; they live in the remote
//! control store (see [`crate::control`]).

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TracerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The service the gateway sits in front of.
    pub upstream: UpstreamConfig,

    /// Remote control and trace services.
    pub remote: RemoteConfig,

    /// Endpoint configuration caching.
    pub cache: CacheConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "127.0.0.1:3000").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Remote control store and trace collector.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL shared by `/control` and `/logs`.
    pub base_url: String,

    /// Credential sent with every remote call.
    /// Must come from the config file or `TRACE_GATE_API_KEY`.
    pub api_key: String,

    /// Header carrying the credential.
    pub api_key_header: String,

    /// Honor HTTP(S)_PROXY / NO_PROXY from the environment.
    pub use_system_proxy: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:4000/api/logs".to_string(),
            api_key: String::new(),
            api_key_header: "x-api-key".to_string(),
            use_system_proxy: true,
        }
    }
}

/// Endpoint configuration cache.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds a fetched endpoint config stays fresh. 0 fetches on every request.
    pub ttl_secs: u64,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time for the upstream request/response in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level for the process log (trace, debug, info, warn, error).
    pub log_level: String,

    /// Lowest level copied into request traces.
    pub capture_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            capture_level: "debug".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
