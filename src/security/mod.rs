//! Access control subsystem.
//!
//! # Data Flow
//! ```text
//! EndpointConfig + client address
//!     → gate.rs (api switch → 503)
//!     → rate_limit.rs (endpoint limiter → 429)
//!     → admitted, with RateLimit-* verdict
//! ```
//!
//! # Design Decisions
//! - A rejection carries the complete response; callers send it untouched
//! - Limiters are created on first use and never resized

pub mod gate;
pub mod rate_limit;

pub use gate::{tracer_enabled, tracer_enabled_at, AccessGate, GateDecision};
pub use rate_limit::{EndpointLimiter, LimiterRegistry, RateLimitDecision};
