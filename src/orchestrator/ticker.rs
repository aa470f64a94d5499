//! Periodic tick source for the controller loop.
//!
//! The interval only exists while the sequencer runs. Dropping it on pause,
//! reset, or completion means no stale tick can fire afterwards, and a later
//! start always waits a full period before the first tick.

use tokio::time::{Duration, Instant, Interval, MissedTickBehavior};

pub(crate) struct TickSource {
    period: Duration,
    interval: Option<Interval>,
}

impl TickSource {
    pub(crate) fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Arm or disarm to match the sequencer's running flag.
    pub(crate) fn sync(&mut self, running: bool) {
        match (running, self.interval.is_some()) {
            (true, false) => {
                let start = Instant::now() + self.period;
                let mut interval = tokio::time::interval_at(start, self.period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                self.interval = Some(interval);
            }
            (false, true) => self.interval = None,
            _ => {}
        }
    }

    /// Resolve on the next tick. Never resolves while disarmed.
    pub(crate) async fn next(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => futures::future::pending::<()>().await,
        }
    }
}
