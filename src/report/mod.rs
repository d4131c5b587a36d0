//! Trace reporting subsystem.
//!
//! # Data Flow
//! ```text
//! response finished
//!     → record.rs TraceRecord (id, method, endpoint, status, timing, logs)
//!     → reporter.rs send (spawned task)
//!         → POST /logs
//!         → success: info log / failure: error log, never retried
//! ```

pub mod record;
pub mod reporter;

pub use record::{new_trace_id, TraceRecord};
pub use reporter::{ReportError, TraceReporter};
