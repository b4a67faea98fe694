use clap::Subcommand;
use focusloop_core::{ConfigError, Settings, SettingsPatch};

use super::Workspace;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a setting
    Get {
        /// Setting name (e.g. "work_duration", "label")
        key: String,
    },
    /// Change a setting; durations are in seconds
    Set {
        /// Setting name
        key: String,
        /// New value
        value: String,
    },
    /// List all settings
    List,
    /// Reset settings to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = Workspace::open()?;
    match action {
        ConfigAction::Get { key } => {
            let settings = workspace.settings.load();
            let value = settings.get(&key).ok_or(ConfigError::UnknownKey(key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let patch = SettingsPatch::from_key_value(&key, &value)?;
            update(&workspace, patch)?;
            println!("ok");
        }
        ConfigAction::List => {
            let settings = workspace.settings.load();
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        ConfigAction::Reset => {
            update(&workspace, SettingsPatch::from(&Settings::default()))?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}

/// Settings changes go through the engine so a stopped timer picks up the
/// new duration straight away.
fn update(workspace: &Workspace, patch: SettingsPatch) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = workspace.load_engine();
    workspace.settings.apply(&mut engine, patch)?;
    workspace.save_engine(&engine)?;
    Ok(())
}
