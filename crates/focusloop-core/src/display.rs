//! Presentation helpers shared by every front end.

use serde::{Deserialize, Serialize};

use crate::storage::Settings;
use crate::timer::SessionType;

/// Text the presentation layer shows next to the countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    /// Remaining time as `MM:SS`.
    pub clock: String,
    pub label: String,
    /// 1-based position of the current work session within the cycle.
    pub session_index: u32,
    pub sessions_per_cycle: u32,
}

impl DisplayState {
    pub fn new(
        seconds_left: u32,
        session_type: SessionType,
        completed_work_sessions: u32,
        settings: &Settings,
    ) -> Self {
        let (session_index, sessions_per_cycle) =
            session_position(completed_work_sessions, settings.sessions_before_long_break);
        Self {
            clock: format_mmss(seconds_left),
            label: session_label(session_type, settings),
            session_index,
            sessions_per_cycle,
        }
    }
}

/// Format seconds as `MM:SS`. Minutes are not capped at 99.
pub fn format_mmss(total_secs: u32) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// The configured label, or the session type's name when the label is blank.
pub fn session_label(session_type: SessionType, settings: &Settings) -> String {
    let label = settings.label.trim();
    if label.is_empty() {
        session_type.display_name().to_string()
    } else {
        label.to_string()
    }
}

/// `(index, every)` where index counts 1..=every through the long-break cycle.
pub fn session_position(completed_work_sessions: u32, every: u32) -> (u32, u32) {
    if every == 0 {
        return (1, 0);
    }
    ((completed_work_sessions % every + 1).min(every), every)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_mmss(0), "00:00");
        assert_eq!(format_mmss(59), "00:59");
        assert_eq!(format_mmss(1500), "25:00");
        assert_eq!(format_mmss(61), "01:01");
    }

    #[test]
    fn minutes_are_unbounded() {
        assert_eq!(format_mmss(100 * 60 + 5), "100:05");
    }

    #[test]
    fn blank_label_falls_back_to_session_name() {
        let mut settings = Settings::default();
        assert_eq!(session_label(SessionType::Work, &settings), "work");
        settings.label = "  ".into();
        assert_eq!(session_label(SessionType::LongBreak, &settings), "Long Break");
    }

    #[test]
    fn position_wraps_with_cycle() {
        assert_eq!(session_position(0, 4), (1, 4));
        assert_eq!(session_position(3, 4), (4, 4));
        assert_eq!(session_position(4, 4), (1, 4));
        assert_eq!(session_position(9, 4), (2, 4));
    }
}
