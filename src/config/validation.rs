//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, URLs, header names and levels
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: TracerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::{uri::Authority, HeaderName};
use thiserror::Error;
use tracing::Level;

use crate::config::schema::TracerConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("remote.api_key is empty (set it in the file or TRACE_GATE_API_KEY)")]
    MissingApiKey,

    #[error("remote.base_url '{0}' is not a valid URL")]
    InvalidBaseUrl(String),

    #[error("remote.api_key_header '{0}' is not a valid header name")]
    InvalidHeaderName(String),

    #[error("{field} '{value}' is not a valid address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} '{value}' is not a valid log level")]
    InvalidLevel { field: &'static str, value: String },

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,
}

/// Check a loaded configuration, collecting every problem found.
pub fn validate_config(config: &TracerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.remote.api_key.trim().is_empty() {
        errors.push(ValidationError::MissingApiKey);
    }
    if url::Url::parse(&config.remote.base_url).is_err() {
        errors.push(ValidationError::InvalidBaseUrl(config.remote.base_url.clone()));
    }
    if HeaderName::from_bytes(config.remote.api_key_header.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidHeaderName(
            config.remote.api_key_header.clone(),
        ));
    }

    let mut sockets = vec![("listener.bind_address", &config.listener.bind_address)];
    if config.observability.metrics_enabled {
        sockets.push((
            "observability.metrics_address",
            &config.observability.metrics_address,
        ));
    }
    for (field, value) in sockets {
        if value.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAddress {
                field,
                value: value.clone(),
            });
        }
    }

    if !is_host_port(&config.upstream.address) {
        errors.push(ValidationError::InvalidAddress {
            field: "upstream.address",
            value: config.upstream.address.clone(),
        });
    }

    let levels = [
        ("observability.log_level", &config.observability.log_level),
        ("observability.capture_level", &config.observability.capture_level),
    ];
    for (field, value) in levels {
        if value.parse::<Level>().is_err() {
            errors.push(ValidationError::InvalidLevel {
                field,
                value: value.clone(),
            });
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `host:port` where host is a name or an IP literal.
fn is_host_port(value: &str) -> bool {
    value.parse::<Authority>().is_ok_and(|authority| {
        !authority.host().is_empty() && authority.port_u16().is_some() && !value.contains('@')
    })
}
