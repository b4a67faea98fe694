//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()`
//! periodically (see [`Ticker`](super::Ticker)).
//!
//! Remaining time is never decremented per tick. While running, the truth
//! is the absolute `end_at_ms` deadline and `seconds_left` is a snapshot
//! refreshed by each tick, so late or throttled ticks cannot cause drift.
//!
//! ## State Transitions
//!
//! ```text
//! Idle    --start()-->              Running
//! Running --pause()-->              Paused
//! Paused  --resume()-->             Running
//! any     --reset()-->              Idle
//! Running --tick(), time left-->    Running
//! Running --tick(), time up-->      Idle (next session armed)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(Settings::default());
//! engine.start();
//! // In a loop:
//! engine.tick(clock.now_ms()); // Returns Some(Event) when a session completes
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::clock::{deadline_after, seconds_until, Clock, SystemClock};
use super::policy::{duration_for, next_session_type, SessionType};
use crate::display::DisplayState;
use crate::error::Result;
use crate::events::{timestamp, Event};
use crate::storage::{Settings, SettingsPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Idle,
    Running,
    Paused,
}

/// The mutable core of the timer.
///
/// `end_at_ms` is present exactly when `status` is `Running`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub status: Status,
    pub session_type: SessionType,
    pub seconds_left: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_at_ms: Option<u64>,
    #[serde(default)]
    pub completed_work_sessions: u32,
}

impl TimerState {
    /// Fresh state: idle, at the start of a work session.
    pub fn initial(settings: &Settings) -> Self {
        Self {
            status: Status::Idle,
            session_type: SessionType::Work,
            seconds_left: duration_for(SessionType::Work, settings),
            end_at_ms: None,
            completed_work_sessions: 0,
        }
    }
}

/// Outcome of a completion listener. Failures are best-effort only.
pub type ListenerResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Notified once per completed session.
///
/// Errors are logged and dropped; a failing listener never affects the timer.
pub trait CompletionListener: Send {
    fn on_session_complete(&self, completed: SessionType, next: SessionType) -> ListenerResult;
}

impl<F> CompletionListener for F
where
    F: Fn(SessionType, SessionType) -> ListenerResult + Send,
{
    fn on_session_complete(&self, completed: SessionType, next: SessionType) -> ListenerResult {
        self(completed, next)
    }
}

/// Core timer engine.
pub struct TimerEngine<C: Clock = SystemClock> {
    settings: Settings,
    state: TimerState,
    clock: C,
    listeners: Vec<Box<dyn CompletionListener>>,
    status_tx: watch::Sender<Status>,
}

impl TimerEngine<SystemClock> {
    /// Create an idle engine on the system clock.
    pub fn new(settings: Settings) -> Self {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: Clock> TimerEngine<C> {
    pub fn with_clock(settings: Settings, clock: C) -> Self {
        let state = TimerState::initial(&settings);
        Self::from_parts(settings, state, clock)
    }

    /// Rebuild an engine from persisted state.
    ///
    /// A state that breaks the `end_at_ms`/`Running` pairing is repaired:
    /// running without a deadline becomes paused, a deadline on a stopped
    /// timer is dropped.
    pub fn restore(settings: Settings, mut state: TimerState, clock: C) -> Self {
        match (state.status, state.end_at_ms) {
            (Status::Running, None) => {
                tracing::warn!("restored running timer has no deadline, pausing it");
                state.status = Status::Paused;
            }
            (Status::Idle | Status::Paused, Some(_)) => {
                tracing::warn!(status = ?state.status, "restored stopped timer has a deadline, dropping it");
                state.end_at_ms = None;
            }
            _ => {}
        }
        Self::from_parts(settings, state, clock)
    }

    fn from_parts(settings: Settings, state: TimerState, clock: C) -> Self {
        let (status_tx, _) = watch::channel(state.status);
        Self {
            settings,
            state,
            clock,
            listeners: Vec::new(),
            status_tx,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> Status {
        self.state.status
    }

    pub fn session_type(&self) -> SessionType {
        self.state.session_type
    }

    /// Remaining seconds as of the last recomputation.
    pub fn seconds_left(&self) -> u32 {
        self.state.seconds_left
    }

    pub fn end_at_ms(&self) -> Option<u64> {
        self.state.end_at_ms
    }

    pub fn completed_work_sessions(&self) -> u32 {
        self.state.completed_work_sessions
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn display(&self) -> DisplayState {
        DisplayState::new(
            self.state.seconds_left,
            self.state.session_type,
            self.state.completed_work_sessions,
            &self.settings,
        )
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            status: self.state.status,
            session_type: self.state.session_type,
            seconds_left: self.state.seconds_left,
            end_at_ms: self.state.end_at_ms,
            completed_work_sessions: self.state.completed_work_sessions,
            settings: self.settings.clone(),
            display: self.display(),
            at: timestamp(self.clock.now_ms()),
        }
    }

    /// Receiver that observes every status change.
    pub fn subscribe_status(&self) -> watch::Receiver<Status> {
        self.status_tx.subscribe()
    }

    pub fn add_completion_listener(&mut self, listener: Box<dyn CompletionListener>) {
        self.listeners.push(listener);
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start the countdown. A no-op while already running.
    ///
    /// From idle the current session starts at its full duration; from
    /// paused the preserved remaining time is used.
    pub fn start(&mut self) -> Option<Event> {
        match self.state.status {
            Status::Running => None,
            Status::Idle | Status::Paused => {
                if self.state.status == Status::Idle {
                    self.state.seconds_left = duration_for(self.state.session_type, &self.settings);
                }
                let now = self.clock.now_ms();
                let end_at_ms = deadline_after(now, self.state.seconds_left);
                self.state.end_at_ms = Some(end_at_ms);
                self.set_status(Status::Running);
                tracing::debug!(
                    session = ?self.state.session_type,
                    seconds_left = self.state.seconds_left,
                    "timer started"
                );
                Some(Event::TimerStarted {
                    session_type: self.state.session_type,
                    seconds_left: self.state.seconds_left,
                    end_at_ms,
                    at: timestamp(now),
                })
            }
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.state.status != Status::Running {
            return None;
        }
        let now = self.clock.now_ms();
        if let Some(end_at_ms) = self.state.end_at_ms.take() {
            self.state.seconds_left = seconds_until(end_at_ms, now);
        }
        self.set_status(Status::Paused);
        tracing::debug!(seconds_left = self.state.seconds_left, "timer paused");
        Some(Event::TimerPaused {
            seconds_left: self.state.seconds_left,
            at: timestamp(now),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.state.status != Status::Paused {
            return None;
        }
        let now = self.clock.now_ms();
        let end_at_ms = deadline_after(now, self.state.seconds_left);
        self.state.end_at_ms = Some(end_at_ms);
        self.set_status(Status::Running);
        tracing::debug!(seconds_left = self.state.seconds_left, "timer resumed");
        Some(Event::TimerResumed {
            seconds_left: self.state.seconds_left,
            end_at_ms,
            at: timestamp(now),
        })
    }

    /// Back to idle at the full duration of the current session.
    /// The session type and completed count are kept.
    pub fn reset(&mut self) -> Option<Event> {
        self.state.end_at_ms = None;
        self.state.seconds_left = duration_for(self.state.session_type, &self.settings);
        self.set_status(Status::Idle);
        tracing::debug!(session = ?self.state.session_type, "timer reset");
        Some(Event::TimerReset {
            session_type: self.state.session_type,
            seconds_left: self.state.seconds_left,
            at: timestamp(self.clock.now_ms()),
        })
    }

    /// Recompute remaining time against `now_ms`.
    ///
    /// Ignored unless running, so a stray tick after pause/reset is harmless.
    /// Returns `Some(Event::SessionCompleted)` when the session runs out.
    pub fn tick(&mut self, now_ms: u64) -> Option<Event> {
        if self.state.status != Status::Running {
            return None;
        }
        let end_at_ms = self.state.end_at_ms?;
        let left = seconds_until(end_at_ms, now_ms);
        if left > 0 {
            self.state.seconds_left = left;
            tracing::trace!(seconds_left = left, "tick");
            return None;
        }

        self.state.seconds_left = 0;
        self.state.end_at_ms = None;
        self.set_status(Status::Idle);
        Some(self.advance(now_ms))
    }

    /// Merge `patch` into the settings.
    ///
    /// When the timer is not running the current session is retargeted to
    /// its new nominal duration at once, discarding any partial countdown.
    /// A running countdown is left alone; the new durations apply from the
    /// next session or reset.
    ///
    /// # Errors
    ///
    /// Returns a configuration error, and changes nothing, if the merged
    /// settings have a zero duration or a zero long-break cycle.
    pub fn apply_settings_update(&mut self, patch: SettingsPatch) -> Result<Option<Event>> {
        let merged = patch.merge_into(&self.settings);
        merged.validate()?;
        self.settings = merged;

        let retargeted = self.state.status != Status::Running;
        if retargeted {
            self.state.seconds_left = duration_for(self.state.session_type, &self.settings);
            self.state.end_at_ms = None;
        }
        tracing::debug!(retargeted, "settings updated");
        Ok(Some(Event::SettingsUpdated {
            settings: self.settings.clone(),
            retargeted,
            at: timestamp(self.clock.now_ms()),
        }))
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Arm the next session (idle) after the current one ran out.
    fn advance(&mut self, now_ms: u64) -> Event {
        let completed = self.state.session_type;
        let next = next_session_type(completed, self.state.completed_work_sessions, &self.settings);
        if completed == SessionType::Work {
            self.state.completed_work_sessions = self.state.completed_work_sessions.saturating_add(1);
        }
        self.state.session_type = next;
        self.state.seconds_left = duration_for(next, &self.settings);
        self.state.end_at_ms = None;
        self.set_status(Status::Idle);

        tracing::debug!(
            ?completed,
            ?next,
            completed_work_sessions = self.state.completed_work_sessions,
            "session completed"
        );
        self.notify_completion(completed, next);

        Event::SessionCompleted {
            completed,
            next,
            completed_work_sessions: self.state.completed_work_sessions,
            next_duration_secs: self.state.seconds_left,
            at: timestamp(now_ms),
        }
    }

    fn notify_completion(&self, completed: SessionType, next: SessionType) {
        for listener in &self.listeners {
            if let Err(e) = listener.on_session_complete(completed, next) {
                tracing::debug!(error = %e, "completion listener failed");
            }
        }
    }

    fn set_status(&mut self, status: Status) {
        self.state.status = status;
        self.status_tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }
}

impl<C: Clock + std::fmt::Debug> std::fmt::Debug for TimerEngine<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("clock", &self.clock)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
