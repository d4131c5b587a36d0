//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, TraceLayer)
//!     → middleware/tracer.rs (endpoint key, control, gate, capture)
//!     → server.rs proxy_handler (forward to upstream)
//!     → body.rs (trace shipped once the response body completes)
//!     → Send to client
//! ```

pub mod body;
pub mod endpoint;
pub mod middleware;
pub mod server;

pub use endpoint::endpoint_key;
pub use middleware::{attach, tracer_middleware, TracerState};
pub use server::HttpServer;
