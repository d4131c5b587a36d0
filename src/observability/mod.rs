//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields)
//!         → logging.rs fmt layer (process log)
//!         → capture::CaptureLayer (request traces)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → remote trace collector (via report)
//!     → Prometheus scrape (optional)
//! ```

pub mod logging;
pub mod metrics;
