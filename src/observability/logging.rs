//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global subscriber
//! - Route events to the process log (fmt, filtered by `log_level` / `RUST_LOG`)
//! - Route events to request captures (filtered by `capture_level`)

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::capture::CaptureLayer;
use crate::config::ObservabilityConfig;

/// Install the global subscriber. Call once at startup.
pub fn init_logging(config: &ObservabilityConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("trace_gate={0},tower_http={0}", config.log_level).into());

    let capture_level = config
        .capture_level
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .with(CaptureLayer::new().with_filter(capture_level))
        .init();
}
