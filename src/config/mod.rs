//! Process configuration subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + TRACE_GATE_API_KEY
//!     → loader.rs (parse, deserialize, apply credential override)
//!     → validation.rs (semantic checks)
//!     → TracerConfig (validated, immutable)
//!     → handed to HttpServer / TracerState at startup
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - The remote credential never has a usable default
//! - Per-endpoint control settings are remote, not part of this config

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CacheConfig, ListenerConfig, ObservabilityConfig, RemoteConfig, TimeoutConfig, TracerConfig,
    UpstreamConfig,
};
