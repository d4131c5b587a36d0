//! Time-windowed tracing.
//!
//! # Data Flow
//! ```text
//! EndpointConfig (toggles.schedule, start/end)
//!     → controller.rs reconcile (create / keep / replace / remove pair)
//!         → trigger.rs (one task per daily HH:MM, logs open/close)
//!
//! per request:
//!     → window.rs is_active(start, end) against the local clock
//! ```

pub mod controller;
pub mod trigger;
pub mod window;

pub use controller::{Reconcile, ScheduleController};
pub use trigger::DailyTrigger;
pub use window::{format_hhmm, is_active, is_active_at, parse_hhmm};
