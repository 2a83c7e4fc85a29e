use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

/// Service settings for the alert core.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    /// Directory holding alert configuration documents
    pub data_dir: PathBuf,
    /// Default tender count for the interactive "Test Alert" replay
    pub default_test_limit: usize,
    /// Account email used when a configuration has no custom address
    pub fallback_email: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/alerts"),
            // Matches the portal's default test limit
            default_test_limit: 10,
            fallback_email: String::new(),
        }
    }
}

pub struct SettingsManager {
    settings_path: PathBuf,
}

impl SettingsManager {
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            settings_path: config_dir.join("settings.json"),
        }
    }

    /// Load settings, falling back to defaults on a missing or corrupt file.
    pub fn load(&self) -> Settings {
        if self.settings_path.exists() {
            if let Ok(content) = fs::read_to_string(&self.settings_path) {
                if let Ok(settings) = serde_json::from_str(&content) {
                    return settings;
                }
                log::warn!(
                    "Corrupt settings file {}, using defaults",
                    self.settings_path.display()
                );
            }
        }
        Settings::default()
    }

    pub fn save(&self, settings: &Settings) -> io::Result<()> {
        // Ensure directory exists
        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.settings_path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let manager = SettingsManager::new(dir.path().to_path_buf());

        let default = manager.load();
        assert_eq!(default.default_test_limit, 10);

        let new_settings = Settings {
            data_dir: PathBuf::from("/tmp/alerts"),
            default_test_limit: 25,
            fallback_email: "user@example.com".to_string(),
        };

        manager.save(&new_settings).unwrap();
        let loaded = manager.load();

        assert_eq!(loaded.data_dir, PathBuf::from("/tmp/alerts"));
        assert_eq!(loaded.default_test_limit, 25);
        assert_eq!(loaded.fallback_email, "user@example.com");
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("settings.json"), "{not json").unwrap();

        let manager = SettingsManager::new(dir.path().to_path_buf());
        let settings = manager.load();
        assert_eq!(settings.default_test_limit, 10);
    }
}
