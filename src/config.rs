//! Configuration management for the measurement wizard
//!
//! This module provides runtime configuration loading from JSON files,
//! enabling deployments to adjust the wizard cadence and the storage
//! location without recompilation. Missing or invalid config files fall
//! back to defaults with a logged warning.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub wizard: WizardConfig,
    pub storage: StorageConfig,
}

/// Wizard cadence parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Number of measurements collected per reference point
    pub measurements_per_point: usize,
    /// Seconds the completed screen stays up before the run auto-resets
    pub auto_reset_secs: u64,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            measurements_per_point: 3,
            auto_reset_secs: 3,
        }
    }
}

/// Record storage parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory the file-backed store keeps its entries in
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Default for AppConfig {
    /// Default configuration values (fallback if config file not found)
    fn default() -> Self {
        Self {
            wizard: WizardConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// * `AppConfig` - Loaded configuration, or defaults if the file is
    ///   missing or does not parse
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Save configuration to JSON file (pretty-printed)
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.wizard.measurements_per_point, 3);
        assert_eq!(config.wizard.auto_reset_secs, 3);
        assert_eq!(config.storage.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from_file("/nonexistent/poverka.json");
        assert_eq!(config.wizard.measurements_per_point, 3);
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.wizard.measurements_per_point = 5;
        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::load_from_file(&path);
        assert_eq!(loaded.wizard.measurements_per_point, 5);
    }

    #[test]
    fn test_load_invalid_json_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        let config = AppConfig::load_from_file(&path);
        assert_eq!(config.wizard.auto_reset_secs, 3);
    }
}
