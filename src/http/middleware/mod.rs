//! HTTP middleware.

pub mod tracer;

pub use tracer::{attach, tracer_middleware, TracerState};
