//! Persistence collaborators.
//!
//! Everything the timer needs to survive a restart goes through the
//! [`KeyValueStore`] contract: structured records saved under a fixed
//! logical key and loaded back with a fallback.

pub mod database;
pub mod file_store;
mod settings;

pub use database::Database;
pub use file_store::FileStore;
pub use settings::{Settings, SettingsPatch, SettingsStore, SETTINGS_KEY};

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

/// Key/value persistence with structured (JSON-shaped) values.
pub trait KeyValueStore {
    /// Raw record stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError>;

    /// Replace the record stored under `key`.
    fn write(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError>;

    /// Load a typed record, returning `fallback` when it is missing,
    /// unreadable or malformed.
    fn load<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T
    where
        Self: Sized,
    {
        let raw = match self.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return fallback,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read stored record, using fallback");
                return fallback;
            }
        };
        match serde_json::from_value(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "stored record is malformed, using fallback");
                fallback
            }
        }
    }

    /// Serialize and store a typed record.
    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError>
    where
        Self: Sized,
    {
        self.write(key, serde_json::to_value(value)?)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn read(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError> {
        (**self).write(key, value)
    }
}

/// In-process store. Nothing outlives the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Returns the data directory, creating it if needed.
///
/// `FOCUSLOOP_DATA_DIR` overrides the location outright. Otherwise it is
/// `~/.config/focusloop`, or `~/.config/focusloop-dev` when
/// `FOCUSLOOP_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("FOCUSLOOP_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOCUSLOOP_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focusloop-dev")
            } else {
                base_dir.join("focusloop")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
