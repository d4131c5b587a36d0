//! Per-endpoint request gating and tracing middleware.

pub mod capture;
pub mod config;
pub mod control;
pub mod http;
pub mod observability;
pub mod remote;
pub mod report;
pub mod schedule;
pub mod security;

pub use config::TracerConfig;
pub use http::{attach, HttpServer, TracerState};
