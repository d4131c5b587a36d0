//! Daily wall-clock triggers.
//!
//! A [`DailyTrigger`] runs a callback every day at a fixed local HH:MM on its
//! own tokio task. The task lives exactly as long as the handle: dropping the
//! handle closes the stop channel and the task exits.

use std::time::Duration;

use chrono::{DateTime, Local, NaiveTime, TimeDelta, TimeZone};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Handle to a running daily trigger.
#[derive(Debug)]
pub struct DailyTrigger {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl DailyTrigger {
    /// Spawn a trigger firing at `minute_of_day` (0..1440) local time.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(minute_of_day: u32, callback: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let (stop, mut stopped) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            loop {
                let wait = until_next(minute_of_day, &Local::now());
                tokio::select! {
                    _ = tokio::time::sleep(wait) => callback(),
                    _ = &mut stopped => break,
                }
            }
        });

        Self { stop, task }
    }

    /// Stop the trigger. It will not fire again.
    pub fn stop(self) {
        drop(self.stop);
    }

    /// True until the background task has exited.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

/// Time from `now` until the next occurrence of `minute_of_day` in `now`'s zone.
///
/// An occurrence exactly at `now` counts as already passed.
pub fn until_next<Tz: TimeZone>(minute_of_day: u32, now: &DateTime<Tz>) -> Duration {
    let minute_of_day = minute_of_day % (24 * 60);
    let time = NaiveTime::from_hms_opt(minute_of_day / 60, minute_of_day % 60, 0)
        .unwrap_or(NaiveTime::MIN);

    let zone = now.timezone();
    let mut target = now.date_naive().and_time(time);
    for _ in 0..3 {
        // DST gaps have no local instant; skip to the next day.
        if let Some(candidate) = zone.from_local_datetime(&target).earliest() {
            if candidate > *now {
                return candidate
                    .signed_duration_since(now)
                    .to_std()
                    .unwrap_or_default();
            }
        }
        target += TimeDelta::days(1);
    }

    Duration::from_secs(24 * 60 * 60)
}
