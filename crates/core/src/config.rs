//! Persisted user settings. Stored as JSON under the platform config
//! directory; loading falls back to defaults so a corrupt or missing file
//! never blocks startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Board used by board-aware tooling when none is specified.
    pub default_board: Option<String>,
    /// Overrides checkout-root discovery when set.
    pub checkout_root: Option<PathBuf>,
    /// Keys of one-time prompts the user dismissed with "don't show again".
    pub suppressed_prompts: Vec<String>,
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("crosscope/settings.json"))
    }

    /// Loads from the default location, falling back to defaults on any
    /// error (missing file, unreadable JSON).
    pub fn load() -> Settings {
        let Some(path) = Self::config_path() else {
            return Settings::default();
        };
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(err) => {
                if path.exists() {
                    tracing::warn!(path = %path.display(), %err, "ignoring unreadable settings");
                }
                Settings::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Settings> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn is_prompt_suppressed(&self, key: &str) -> bool {
        self.suppressed_prompts.iter().any(|k| k == key)
    }

    pub fn suppress_prompt(&mut self, key: &str) {
        if !self.is_prompt_suppressed(key) {
            self.suppressed_prompts.push(key.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/settings.json");

        let mut settings = Settings {
            default_board: Some("kevin".to_string()),
            checkout_root: Some(PathBuf::from("/cros")),
            suppressed_prompts: vec![],
        };
        settings.suppress_prompt("add-folder:platform2");
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
        assert!(loaded.is_prompt_suppressed("add-folder:platform2"));
        assert!(!loaded.is_prompt_suppressed("add-folder:chromium"));
    }

    #[test]
    fn suppress_is_idempotent() {
        let mut settings = Settings::default();
        settings.suppress_prompt("x");
        settings.suppress_prompt("x");
        assert_eq!(settings.suppressed_prompts.len(), 1);
    }

    #[test]
    fn unknown_fields_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"default_board":"eve","future_option":true}"#).unwrap();
        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.default_board.as_deref(), Some("eve"));
    }
}
