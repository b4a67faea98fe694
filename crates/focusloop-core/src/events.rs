use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::display::DisplayState;
use crate::storage::Settings;
use crate::timer::{SessionType, Status};

/// Every state change of the timer produces an Event.
/// The presentation layer renders them; listeners subscribe to completions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        session_type: SessionType,
        seconds_left: u32,
        end_at_ms: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        seconds_left: u32,
        at: DateTime<Utc>,
    },
    TimerResumed {
        seconds_left: u32,
        end_at_ms: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        session_type: SessionType,
        seconds_left: u32,
        at: DateTime<Utc>,
    },
    /// A session ran out and the next one has been armed (idle).
    SessionCompleted {
        completed: SessionType,
        next: SessionType,
        completed_work_sessions: u32,
        next_duration_secs: u32,
        at: DateTime<Utc>,
    },
    SettingsUpdated {
        settings: Settings,
        /// Whether the current session's remaining time was retargeted.
        retargeted: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        status: Status,
        session_type: SessionType,
        seconds_left: u32,
        end_at_ms: Option<u64>,
        completed_work_sessions: u32,
        settings: Settings,
        display: DisplayState,
        at: DateTime<Utc>,
    },
}

/// Convert clock milliseconds into an event timestamp.
pub(crate) fn timestamp(now_ms: u64) -> DateTime<Utc> {
    i64::try_from(now_ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default()
}
