use chrono::{DateTime, Local, NaiveDateTime};
use std::time::Duration;
use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

pub const TICK: Duration = Duration::from_secs(1);

/// `03:04:05 PM`
pub fn format_time(at: &NaiveDateTime) -> String {
    at.format("%I:%M:%S %p").to_string()
}

/// `Saturday, October 17, 2026`
pub fn format_date(at: &NaiveDateTime) -> String {
    at.format("%A, %B %-d, %Y").to_string()
}

/// Periodic clock task that lives exactly as long as this value.
///
/// The callback runs once immediately and then every `period`. Dropping the
/// ticker aborts the task.
#[derive(Debug)]
pub struct ClockTicker {
    handle: JoinHandle<()>,
}

impl ClockTicker {
    pub fn start<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(DateTime<Local>) + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                on_tick(Local::now());
            }
        });

        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for ClockTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
