//! Remote per-endpoint control subsystem.
//!
//! # Data Flow
//! ```text
//! request path
//!     → endpoint key (/first/second)
//!     → resolver.rs (cache hit, or GET /control)
//!         → unseen key: model.rs default → PUT /control (best effort)
//!     → EndpointConfig (toggles, limit policy, schedule policy)
//! ```
//!
//! # Design Decisions
//! - Resolution fails softly: callers degrade instead of failing the request
//! - Caching is opt-in; with a zero TTL every request reads the store
//! - Wire field names follow the control store (`endpoint`, `limitValues`, ...)

pub mod client;
pub mod model;
pub mod resolver;

pub use client::{ControlClient, ControlError, StoredEntry};
pub use model::{EndpointConfig, LimitPolicy, SchedulePolicy, Toggles};
pub use resolver::ConfigResolver;
