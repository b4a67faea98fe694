//! TOML file storage.
//!
//! Each key is a top-level table of a single TOML document, so the
//! settings live in a hand-editable `config.toml`:
//!
//! ```toml
//! [pomodoro_settings]
//! work_duration = 1500
//! short_break_duration = 300
//! ```

use std::path::{Path, PathBuf};

use super::{data_dir, KeyValueStore};
use crate::error::StorageError;

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store backed by `<data dir>/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn open() -> Result<Self, StorageError> {
        Ok(Self::at(data_dir()?.join("config.toml")))
    }

    /// Store backed by an explicit file. The file is created on first write.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<toml::Table, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(toml::Table::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        let document = self.read_document()?;
        match document.get(key) {
            Some(value) => Ok(Some(serde_json::to_value(value)?)),
            None => Ok(None),
        }
    }

    fn write(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError> {
        // An unparseable document is replaced wholesale.
        let mut document = match self.read_document() {
            Err(StorageError::TomlParse(e)) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "discarding unreadable settings file"
                );
                toml::Table::new()
            }
            other => other?,
        };
        document.insert(key.to_string(), toml::Value::try_from(value)?);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&document)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}
