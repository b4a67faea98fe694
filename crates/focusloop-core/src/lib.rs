//! # Focusloop Core Library
//!
//! Core logic of the Focusloop Pomodoro timer: a work / short break /
//! long break cycle whose countdown is derived from wall-clock deadlines
//! rather than a decrementing counter, so delayed or throttled ticks never
//! accumulate drift.
//!
//! ## Architecture
//!
//! - **Session policy**: pure functions choosing the next session and its
//!   duration
//! - **Timer engine**: the state machine; the caller drives it by calling
//!   `tick(now)` periodically
//! - **Ticker**: an async driver that fires every 250ms while the engine is
//!   running and sleeps on the status subscription otherwise
//! - **Storage**: settings and timer state behind a key-value contract,
//!   backed by a TOML file, SQLite, or memory
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`Settings`]: Durations and long-break cycle
//! - [`SettingsStore`]: Load-with-fallback and persist-on-update for settings
//! - [`Event`]: Transition events and state snapshots

pub mod display;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use display::{format_mmss, DisplayState};
pub use error::{ConfigError, CoreError, StorageError};
pub use events::Event;
pub use storage::{
    Database, FileStore, KeyValueStore, MemoryStore, Settings, SettingsPatch, SettingsStore,
};
pub use timer::{
    Clock, CompletionListener, ManualClock, SessionType, Status, SystemClock, Ticker,
    TimerEngine, TimerState,
};
