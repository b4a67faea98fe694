//! Session policy.
//!
//! Pure functions deciding which session follows the current one and how
//! long a session lasts. No state, no side effects.

use serde::{Deserialize, Serialize};

use crate::storage::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    /// Human readable name, used when no label is configured.
    pub fn display_name(self) -> &'static str {
        match self {
            SessionType::Work => "Work",
            SessionType::ShortBreak => "Short Break",
            SessionType::LongBreak => "Long Break",
        }
    }
}

/// Session that follows `current`.
///
/// `completed_work_sessions` is the count *before* the current session is
/// credited. A work session whose completion makes the count a multiple of
/// `sessions_before_long_break` is followed by a long break. Breaks are
/// always followed by work.
///
/// `sessions_before_long_break == 0` is rejected by [`Settings::validate`];
/// should it reach this function anyway, work falls through to a short break.
pub fn next_session_type(
    current: SessionType,
    completed_work_sessions: u32,
    settings: &Settings,
) -> SessionType {
    match current {
        SessionType::Work => {
            let every = settings.sessions_before_long_break;
            let credited = completed_work_sessions.saturating_add(1);
            if every != 0 && credited % every == 0 {
                SessionType::LongBreak
            } else {
                SessionType::ShortBreak
            }
        }
        SessionType::ShortBreak | SessionType::LongBreak => SessionType::Work,
    }
}

/// Nominal duration of `session_type` in seconds.
pub fn duration_for(session_type: SessionType, settings: &Settings) -> u32 {
    match session_type {
        SessionType::Work => settings.work_duration,
        SessionType::ShortBreak => settings.short_break_duration,
        SessionType::LongBreak => settings.long_break_duration,
    }
}
