//! Per-request log capture.
//!
//! # Data Flow
//! ```text
//! pipeline: CaptureHandle::begin(method, endpoint)
//!     → handle.scope(downstream future)      (task-local, this request only)
//!         → tracing::info!/warn!/... anywhere downstream
//!             → layer.rs CaptureLayer::on_event
//!                 → CaptureHandle::current().record(level, args)
//!     → handle.finish() → Vec<LogEntry> for the trace record
//! ```
//!
//! # Design Decisions
//! - No process-wide redirection: the sink travels with the request's task
//! - Work spawned onto other tasks is outside the scope and not captured
//! - Without a scope the layer does nothing, so untraced requests pay nothing

pub mod buffer;
pub mod layer;

pub use buffer::{record, stringify, CaptureHandle, LogEntry, LogLevel};
pub use layer::CaptureLayer;
