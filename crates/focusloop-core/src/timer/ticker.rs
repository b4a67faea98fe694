//! Periodic tick driver.
//!
//! Fires at a fixed cadence while the engine is running and parks on the
//! engine's status subscription otherwise, so an idle or paused timer
//! costs no wake-ups. The driver does not call `tick` itself; the owner of
//! the engine does, which keeps every engine operation on one task.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Interval, MissedTickBehavior};

use super::engine::Status;

/// Cadence of the driver while a session is running.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(250);

pub struct Ticker {
    status: watch::Receiver<Status>,
    interval: Interval,
    armed: bool,
    detached: bool,
}

impl Ticker {
    /// Must be called from within a tokio runtime.
    pub fn new(mut status: watch::Receiver<Status>, period: Duration) -> Self {
        let armed = *status.borrow_and_update() == Status::Running;
        let mut interval = tokio::time::interval(period);
        // A throttled process should catch up with one tick, not a burst.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            status,
            interval,
            armed,
            detached: false,
        }
    }

    #[cfg(test)]
    fn is_armed(&self) -> bool {
        self.armed
    }

    /// Resolves when the next tick is due. While the timer is not running
    /// this only waits for the status to change.
    pub async fn wait(&mut self) {
        loop {
            if self.detached {
                std::future::pending::<()>().await;
            }
            if self.armed {
                tokio::select! {
                    _ = self.interval.tick() => return,
                    changed = self.status.changed() => self.observe(changed.is_ok()),
                }
            } else {
                let changed = self.status.changed().await;
                self.observe(changed.is_ok());
            }
        }
    }

    fn observe(&mut self, sender_alive: bool) {
        if !sender_alive {
            tracing::debug!("timer engine dropped, ticker detached");
            self.detached = true;
            self.armed = false;
            return;
        }
        let running = *self.status.borrow_and_update() == Status::Running;
        if running && !self.armed {
            self.interval.reset_immediately();
        }
        if running != self.armed {
            tracing::trace!(armed = running, "ticker re-armed");
        }
        self.armed = running;
    }
}
