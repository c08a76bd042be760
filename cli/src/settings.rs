//! On-disk user settings.
//!
//! Settings live in a single JSON file under `~/.forge` (overridable with
//! the `FORGE_HOME` environment variable), created on first write. Only the
//! known setting names are accepted; everything else is a user input error.

use std::fs;
use std::path::{Path, PathBuf};

use command_engine_core::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// Enables or disables the telemetry sink.
pub const SETTING_TELEMETRY: &str = "telemetry";
/// Default for interactive fill-in of missing required inputs.
pub const SETTING_INTERACTIVE: &str = "interactive";

/// Every user-settable name, in display order.
pub const SETTING_NAMES: &[&str] = &[SETTING_TELEMETRY, SETTING_INTERACTIVE];

/// The user's global settings, round-tripped through JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    /// Record telemetry events to the local sink.
    #[serde(default = "default_true")]
    pub telemetry: bool,
    /// Prompt for missing required inputs.
    #[serde(default = "default_true")]
    pub interactive: bool,
}

fn default_true() -> bool {
    true
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            telemetry: true,
            interactive: true,
        }
    }
}

/// Settings directory: `$FORGE_HOME` or `~/.forge`.
pub fn settings_dir() -> PathBuf {
    if let Ok(home) = std::env::var("FORGE_HOME") {
        return PathBuf::from(home);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".forge")
}

/// Path of the settings file.
pub fn settings_path() -> PathBuf {
    settings_dir().join("settings.json")
}

impl UserSettings {
    /// Loads settings, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes settings, creating the directory on first use.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// One setting by name, or the whole settings object.
    pub fn get(&self, name: Option<&str>) -> Result<serde_json::Value> {
        let all = serde_json::to_value(self)?;
        match name {
            None => Ok(all),
            Some(name) => all.get(name).cloned().ok_or_else(|| {
                EngineError::input_validation(
                    name,
                    format!("unknown setting; expected one of: {}", SETTING_NAMES.join(", ")),
                )
            }),
        }
    }

    /// Updates one setting from its raw string value.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let parsed: bool = value.parse().map_err(|_| {
            EngineError::input_validation(name, format!("'{value}' is not true or false"))
        })?;
        match name {
            SETTING_TELEMETRY => self.telemetry = parsed,
            SETTING_INTERACTIVE => self.interactive = parsed,
            other => {
                return Err(EngineError::input_validation(
                    other,
                    format!("unknown setting; expected one of: {}", SETTING_NAMES.join(", ")),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = UserSettings::load(&dir.path().join("settings.json")).unwrap();
        assert!(settings.telemetry);
        assert!(settings.interactive);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = UserSettings::default();
        settings.set(SETTING_INTERACTIVE, "false").unwrap();
        settings.save(&path).unwrap();

        let loaded = UserSettings::load(&path).unwrap();
        assert!(!loaded.interactive);
        assert!(loaded.telemetry);
    }

    #[test]
    fn test_unknown_setting_rejected() {
        let mut settings = UserSettings::default();
        let err = settings.set("colors", "true").unwrap_err();
        assert_eq!(err.kind(), "input-validation");

        let err = settings.get(Some("colors")).unwrap_err();
        assert_eq!(err.kind(), "input-validation");
    }

    #[test]
    fn test_non_boolean_value_rejected() {
        let mut settings = UserSettings::default();
        let err = settings.set(SETTING_TELEMETRY, "maybe").unwrap_err();
        assert!(err.to_string().contains("not true or false"));
    }
}
