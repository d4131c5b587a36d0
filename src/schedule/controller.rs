//! Per-endpoint schedule job management.
//!
//! # Responsibilities
//! - Keep at most one open/close trigger pair per endpoint key
//! - Tear the pair down as soon as the schedule is disabled or invalid
//! - Rebuild the pair when the window times change
//!
//! # Design Decisions
//! - The registry is a `DashMap`; all transitions for a key happen under
//!   that key's entry lock, so concurrent reconciles cannot duplicate a pair
//! - Triggers only log; tracing is decided per request from the window

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::control::EndpointConfig;
use crate::observability::metrics;
use crate::schedule::trigger::DailyTrigger;
use crate::schedule::window::{format_hhmm, parse_hhmm};

/// What a reconcile call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconcile {
    /// No schedule wanted and none running.
    Idle,
    /// A new pair was started.
    Created,
    /// The running pair already matches.
    Unchanged,
    /// The running pair had other times and was rebuilt.
    Replaced,
    /// The running pair was stopped and forgotten.
    Removed,
}

/// The two daily triggers of one endpoint.
#[derive(Debug)]
struct ScheduledJobPair {
    window: (u32, u32),
    opened: DailyTrigger,
    closed: DailyTrigger,
}

impl ScheduledJobPair {
    /// Start both triggers. Times are logged from the parsed minutes, so two
    /// spellings of the same time share one pair.
    fn start(endpoint_key: &str, window: (u32, u32)) -> Self {
        let (endpoint, at) = (endpoint_key.to_string(), format_hhmm(window.0));
        let opened = DailyTrigger::spawn(window.0, move || {
            tracing::info!(endpoint = %endpoint, at = %at, "Tracer window opened");
            metrics::record_schedule_trigger("open");
        });

        let (endpoint, at) = (endpoint_key.to_string(), format_hhmm(window.1));
        let closed = DailyTrigger::spawn(window.1, move || {
            tracing::info!(endpoint = %endpoint, at = %at, "Tracer window closed");
            metrics::record_schedule_trigger("close");
        });

        Self {
            window,
            opened,
            closed,
        }
    }

    fn stop(self) {
        self.opened.stop();
        self.closed.stop();
    }
}

/// Registry of schedule trigger pairs keyed by endpoint.
#[derive(Default)]
pub struct ScheduleController {
    jobs: DashMap<String, ScheduledJobPair>,
}

impl ScheduleController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the trigger pair for `endpoint_key` in line with `config`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn reconcile(&self, endpoint_key: &str, config: &EndpointConfig) -> Reconcile {
        let wanted = config
            .toggles
            .schedule
            .then(|| config.schedule_policy.bounds())
            .flatten()
            .and_then(|(start, end)| Some((parse_hhmm(start)?, parse_hhmm(end)?)));

        let Some(window) = wanted else {
            return match self.jobs.remove(endpoint_key) {
                Some((_, pair)) => {
                    pair.stop();
                    tracing::info!(endpoint = %endpoint_key, "Schedule disabled, triggers stopped");
                    Reconcile::Removed
                }
                None => Reconcile::Idle,
            };
        };

        match self.jobs.entry(endpoint_key.to_string()) {
            Entry::Occupied(running) if running.get().window == window => Reconcile::Unchanged,
            Entry::Occupied(mut running) => {
                let old = running.insert(ScheduledJobPair::start(endpoint_key, window));
                old.stop();
                tracing::info!(
                    endpoint = %endpoint_key,
                    start = %format_hhmm(window.0),
                    end = %format_hhmm(window.1),
                    "Schedule changed, triggers replaced"
                );
                Reconcile::Replaced
            }
            Entry::Vacant(slot) => {
                slot.insert(ScheduledJobPair::start(endpoint_key, window));
                tracing::info!(
                    endpoint = %endpoint_key,
                    start = %format_hhmm(window.0),
                    end = %format_hhmm(window.1),
                    "Schedule triggers started"
                );
                Reconcile::Created
            }
        }
    }

    /// Number of endpoints with a running pair.
    pub fn active_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Whether `endpoint_key` has a running pair.
    pub fn has_job(&self, endpoint_key: &str) -> bool {
        self.jobs.contains_key(endpoint_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::SchedulePolicy;

    fn scheduled(start: Option<&str>, end: Option<&str>) -> EndpointConfig {
        let mut config = EndpointConfig::first_seen("/reports/daily");
        config.toggles.schedule = true;
        config.schedule_policy = SchedulePolicy {
            start_time: start.map(String::from),
            end_time: end.map(String::from),
        };
        config
    }

    #[tokio::test]
    async fn test_enable_creates_single_pair() {
        let controller = ScheduleController::new();
        let config = scheduled(Some("09:00"), Some("17:00"));

        assert_eq!(controller.reconcile("/reports/daily", &config), Reconcile::Created);
        assert_eq!(controller.reconcile("/reports/daily", &config), Reconcile::Unchanged);
        assert_eq!(controller.reconcile("/reports/daily", &config), Reconcile::Unchanged);
        assert_eq!(controller.active_jobs(), 1);
    }

    #[tokio::test]
    async fn test_disable_removes_pair() {
        let controller = ScheduleController::new();
        let mut config = scheduled(Some("09:00"), Some("17:00"));
        controller.reconcile("/reports/daily", &config);

        config.toggles.schedule = false;
        assert_eq!(controller.reconcile("/reports/daily", &config), Reconcile::Removed);
        assert!(!controller.has_job("/reports/daily"));
        assert_eq!(controller.reconcile("/reports/daily", &config), Reconcile::Idle);

        config.toggles.schedule = true;
        assert_eq!(controller.reconcile("/reports/daily", &config), Reconcile::Created);
        assert_eq!(controller.active_jobs(), 1);
    }

    #[tokio::test]
    async fn test_invalid_times_remove_pair() {
        let controller = ScheduleController::new();
        controller.reconcile("/reports/daily", &scheduled(Some("22:00"), Some("06:00")));

        let outcome = controller.reconcile("/reports/daily", &scheduled(Some("22:00"), None));
        assert_eq!(outcome, Reconcile::Removed);

        let outcome = controller.reconcile("/reports/daily", &scheduled(Some("25:00"), Some("06:00")));
        assert_eq!(outcome, Reconcile::Idle);
        assert_eq!(controller.active_jobs(), 0);
    }

    #[tokio::test]
    async fn test_changed_times_replace_pair() {
        let controller = ScheduleController::new();
        controller.reconcile("/reports/daily", &scheduled(Some("09:00"), Some("17:00")));

        let outcome = controller.reconcile("/reports/daily", &scheduled(Some("10:00"), Some("17:00")));
        assert_eq!(outcome, Reconcile::Replaced);
        assert_eq!(controller.active_jobs(), 1);
    }

    #[tokio::test]
    async fn test_respelled_times_keep_pair() {
        let controller = ScheduleController::new();
        controller.reconcile("/reports/daily", &scheduled(Some("9:00"), Some("17:00")));

        let outcome = controller.reconcile("/reports/daily", &scheduled(Some("09:00"), Some(" 17:00")));
        assert_eq!(outcome, Reconcile::Unchanged);
        assert_eq!(controller.jobs.get("/reports/daily").unwrap().window, (540, 1020));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let controller = ScheduleController::new();
        let config = scheduled(Some("09:00"), Some("17:00"));
        controller.reconcile("/reports/daily", &config);
        controller.reconcile("/reports/weekly", &config);
        assert_eq!(controller.active_jobs(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reconcile_creates_one_pair() {
        let controller = std::sync::Arc::new(ScheduleController::new());
        let config = scheduled(Some("09:00"), Some("17:00"));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let controller = controller.clone();
                let config = config.clone();
                tokio::spawn(async move { controller.reconcile("/reports/daily", &config) })
            })
            .collect();

        let mut created = 0;
        for task in tasks {
            if task.await.unwrap() == Reconcile::Created {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(controller.active_jobs(), 1);
    }
}
