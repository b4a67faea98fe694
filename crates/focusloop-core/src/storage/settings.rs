//! Timer settings.
//!
//! Durations are whole seconds. Settings are persisted as one structured
//! record under [`SETTINGS_KEY`]; a missing or malformed record silently
//! yields the defaults (25/5/15 minutes, long break every 4 sessions).

use serde::{Deserialize, Serialize};

use super::KeyValueStore;
use crate::error::{ConfigError, Result};
use crate::events::Event;
use crate::timer::{Clock, TimerEngine};

/// Logical key the settings record is stored under.
pub const SETTINGS_KEY: &str = "pomodoro_settings";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_work_duration")]
    pub work_duration: u32,
    #[serde(default = "default_short_break_duration")]
    pub short_break_duration: u32,
    #[serde(default = "default_long_break_duration")]
    pub long_break_duration: u32,
    #[serde(default = "default_sessions_before_long_break")]
    pub sessions_before_long_break: u32,
    #[serde(default = "default_label")]
    pub label: String,
}

// Default functions
fn default_work_duration() -> u32 {
    25 * 60
}
fn default_short_break_duration() -> u32 {
    5 * 60
}
fn default_long_break_duration() -> u32 {
    15 * 60
}
fn default_sessions_before_long_break() -> u32 {
    4
}
fn default_label() -> String {
    "work".into()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_duration: default_work_duration(),
            short_break_duration: default_short_break_duration(),
            long_break_duration: default_long_break_duration(),
            sessions_before_long_break: default_sessions_before_long_break(),
            label: default_label(),
        }
    }
}

impl Settings {
    /// Reject settings the timer cannot run on: a zero duration would
    /// complete instantly forever, a zero cycle length has no long break.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("work_duration", self.work_duration),
            ("short_break_duration", self.short_break_duration),
            ("long_break_duration", self.long_break_duration),
            ("sessions_before_long_break", self.sessions_before_long_break),
        ] {
            if value == 0 {
                return Err(ConfigError::invalid(key, "must be at least 1"));
            }
        }
        Ok(())
    }

    /// Get a field rendered as a string by name.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match json.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// A partial settings update. Unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_break_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_break_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sessions_before_long_break: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl SettingsPatch {
    /// Build a single-field patch from a `key value` pair, typing the value
    /// after the field it targets.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKey`] for keys `Settings` does not have
    /// and [`ConfigError::InvalidValue`] when the value does not parse.
    pub fn from_key_value(key: &str, value: &str) -> Result<Self, ConfigError> {
        let template = serde_json::to_value(Settings::default())
            .map_err(|e| ConfigError::invalid(key, e.to_string()))?;
        let existing = template
            .get(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let parsed = match existing {
            serde_json::Value::Number(_) => value
                .trim()
                .parse::<u32>()
                .map(serde_json::Value::from)
                .map_err(|_| {
                    ConfigError::invalid(key, format!("cannot parse '{value}' as a whole number"))
                })?,
            _ => serde_json::Value::String(value.to_string()),
        };

        let mut fields = serde_json::Map::new();
        fields.insert(key.to_string(), parsed);
        serde_json::from_value(serde_json::Value::Object(fields))
            .map_err(|e| ConfigError::invalid(key, e.to_string()))
    }

    /// Settings with this patch applied on top of `base`.
    pub fn merge_into(&self, base: &Settings) -> Settings {
        Settings {
            work_duration: self.work_duration.unwrap_or(base.work_duration),
            short_break_duration: self.short_break_duration.unwrap_or(base.short_break_duration),
            long_break_duration: self.long_break_duration.unwrap_or(base.long_break_duration),
            sessions_before_long_break: self
                .sessions_before_long_break
                .unwrap_or(base.sessions_before_long_break),
            label: self.label.clone().unwrap_or_else(|| base.label.clone()),
        }
    }
}

/// A patch that sets every field to the values in `settings`.
impl From<&Settings> for SettingsPatch {
    fn from(settings: &Settings) -> Self {
        Self {
            work_duration: Some(settings.work_duration),
            short_break_duration: Some(settings.short_break_duration),
            long_break_duration: Some(settings.long_break_duration),
            sessions_before_long_break: Some(settings.sessions_before_long_break),
            label: Some(settings.label.clone()),
        }
    }
}

/// Settings persisted through a [`KeyValueStore`].
pub struct SettingsStore<S> {
    store: S,
}

impl<S: KeyValueStore> SettingsStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stored settings, or the defaults when nothing usable is stored.
    pub fn load(&self) -> Settings {
        let settings = self.store.load(SETTINGS_KEY, Settings::default());
        match settings.validate() {
            Ok(()) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "stored settings are invalid, using defaults");
                Settings::default()
            }
        }
    }

    /// # Errors
    /// Returns an error if the record cannot be written.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        self.store.save(SETTINGS_KEY, settings)?;
        Ok(())
    }

    /// Persist the merged settings, then apply `patch` to the engine.
    ///
    /// The engine only sees the update once it is stored, so a rejected
    /// patch or a failed write leaves both untouched.
    ///
    /// # Errors
    /// Returns a validation error for an invalid merged result, or a storage
    /// error if the merged settings could not be written.
    pub fn apply<C: Clock>(
        &self,
        engine: &mut TimerEngine<C>,
        patch: SettingsPatch,
    ) -> Result<Option<Event>> {
        let merged = patch.merge_into(engine.settings());
        merged.validate()?;
        self.save(&merged)?;
        engine.apply_settings_update(patch)
    }
}
