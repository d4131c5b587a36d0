//! Per-endpoint control settings as stored by the remote control service.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Window length used when a limit policy leaves `rate` unset.
pub const DEFAULT_WINDOW_MINUTES: u32 = 15;

/// Request ceiling used when a limit policy leaves `number` unset.
pub const DEFAULT_MAX_REQUESTS: u32 = 10;

/// Control settings for one endpoint key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(rename = "endpoint")]
    pub endpoint_key: String,

    #[serde(default)]
    pub toggles: Toggles,

    #[serde(default, rename = "limitValues")]
    pub limit_policy: LimitPolicy,

    #[serde(default, rename = "scheduleValues")]
    pub schedule_policy: SchedulePolicy,
}

impl EndpointConfig {
    /// The entry created for a key the control store has never seen.
    pub fn first_seen(endpoint_key: impl Into<String>) -> Self {
        Self {
            endpoint_key: endpoint_key.into(),
            toggles: Toggles {
                api: true,
                tracer: true,
                limit: false,
                schedule: false,
            },
            limit_policy: LimitPolicy::default(),
            schedule_policy: SchedulePolicy::default(),
        }
    }
}

/// Feature switches for an endpoint.
///
/// A stored entry that omits a switch gets `api = true` and everything
/// else off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toggles {
    #[serde(default = "enabled")]
    pub api: bool,
    #[serde(default)]
    pub tracer: bool,
    #[serde(default)]
    pub limit: bool,
    #[serde(default)]
    pub schedule: bool,
}

fn enabled() -> bool {
    true
}

impl Default for Toggles {
    fn default() -> Self {
        Self {
            api: true,
            tracer: false,
            limit: false,
            schedule: false,
        }
    }
}

/// Rate limit settings. Unset or zero values fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LimitPolicy {
    #[serde(default, rename = "rate")]
    pub window_minutes: Option<u32>,

    #[serde(default, rename = "number")]
    pub max_requests: Option<u32>,
}

impl LimitPolicy {
    pub fn window_minutes(&self) -> u32 {
        self.window_minutes
            .filter(|m| *m > 0)
            .unwrap_or(DEFAULT_WINDOW_MINUTES)
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(u64::from(self.window_minutes()) * 60)
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_REQUESTS)
    }
}

/// Daily tracing window, "HH:MM" local time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchedulePolicy {
    #[serde(default, rename = "start")]
    pub start_time: Option<String>,

    #[serde(default, rename = "end")]
    pub end_time: Option<String>,
}

impl SchedulePolicy {
    /// Both bounds, if both are present and non-empty.
    pub fn bounds(&self) -> Option<(&str, &str)> {
        let start = self.start_time.as_deref().filter(|s| !s.is_empty())?;
        let end = self.end_time.as_deref().filter(|s| !s.is_empty())?;
        Some((start, end))
    }
}
