//! Configuration management for Hoshizu

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::{DEFAULT_STORAGE_KEY, FileBackend, Storage};

/// Environment variable that overrides the data directory
pub const DATA_DIR_ENV: &str = "HOSHIZU_DATA_DIR";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Key the learner-state document is stored under
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Root directory holding one sub-directory per course or book
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,

    /// Where learner state is kept (platform data dir if unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("content")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            content_dir: default_content_dir(),
            data_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from disk, or create default if not exists
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            serde_json::from_str(&contents).with_context(|| "Failed to parse config.json")
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", "hoshizu").context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.json"))
    }

    /// Resolve the data directory: environment, then config, then platform default
    pub fn data_dir(&self) -> Result<PathBuf> {
        self.data_dir_with(std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
    }

    fn data_dir_with(&self, env_override: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = env_override.filter(|d| !d.as_os_str().is_empty()) {
            return Ok(dir);
        }
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let proj_dirs =
            ProjectDirs::from("", "", "hoshizu").context("Failed to determine data directory")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// Open learner-state storage in the data directory
    ///
    /// Falls back to detached storage when no data directory can be found.
    pub fn open_storage(&self) -> Storage {
        self.open_storage_with(std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
    }

    fn open_storage_with(&self, env_override: Option<PathBuf>) -> Storage {
        match self.data_dir_with(env_override) {
            Ok(dir) => Storage::new(FileBackend::new(dir), self.storage_key.clone()),
            Err(e) => {
                warn!(error = %e, "No data directory, progress will not be saved");
                Storage::detached()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn default_config_uses_standard_key() {
        let config = Config::default();
        assert_eq!(config.storage_key, "hoshizu-storage");
        assert_eq!(config.content_dir, PathBuf::from("content"));
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn config_deserializes_with_missing_fields() {
        let config: Config = serde_json::from_str(r#"{"content_dir":"/srv/content"}"#).unwrap();
        assert_eq!(config.storage_key, "hoshizu-storage");
        assert_eq!(config.content_dir, PathBuf::from("/srv/content"));
    }

    #[test]
    fn load_from_creates_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("conf").join("config.json");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn load_from_reads_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        let saved = Config {
            storage_key: "custom".into(),
            data_dir: Some(temp_dir.path().join("data")),
            ..Config::default()
        };
        saved.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), saved);
    }

    #[test]
    fn load_from_rejects_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn data_dir_precedence() {
        let config = Config { data_dir: Some(PathBuf::from("/from/config")), ..Config::default() };

        assert_eq!(
            config.data_dir_with(Some(PathBuf::from("/from/env"))).unwrap(),
            PathBuf::from("/from/env")
        );
        assert_eq!(config.data_dir_with(Some(PathBuf::new())).unwrap(), PathBuf::from("/from/config"));
        assert_eq!(config.data_dir_with(None).unwrap(), PathBuf::from("/from/config"));
    }

    #[test]
    fn open_storage_persists_to_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config { data_dir: Some(temp_dir.path().to_path_buf()), ..Config::default() };

        config.open_storage_with(None).progress().mark_complete("c", "l1");
        assert!(temp_dir.path().join("hoshizu-storage.json").exists());
        assert!(config.open_storage_with(None).progress().is_complete("c", "l1"));
    }

    #[test]
    fn open_storage_prefers_env_directory() {
        let config_dir = TempDir::new().unwrap();
        let env_dir = TempDir::new().unwrap();
        let config = Config { data_dir: Some(config_dir.path().to_path_buf()), ..Config::default() };

        let storage = config.open_storage_with(Some(env_dir.path().to_path_buf()));
        storage.reading().mark_read("intro");
        assert!(env_dir.path().join("hoshizu-storage.json").exists());
        assert!(!config_dir.path().join("hoshizu-storage.json").exists());
    }
}
