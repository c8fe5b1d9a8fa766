//! Persistent CLI configuration.

use std::path::{Path, PathBuf};

use receiptkeep_core::MergeMode;
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "cli-config.json";

pub const DB_PATH_ENV: &str = "RECEIPTKEEP_DB_PATH";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
    #[serde(default)]
    pub default_merge_mode: MergeMode,
}

const fn default_config_version() -> u32 {
    1
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            version: default_config_version(),
            db_path: None,
            work_dir: None,
            default_merge_mode: MergeMode::default(),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    app_dir(dirs::config_dir()).join(CONFIG_FILE_NAME)
}

pub fn default_db_path() -> PathBuf {
    app_dir(dirs::data_dir()).join("receiptkeep.db")
}

pub fn default_work_dir() -> PathBuf {
    app_dir(dirs::cache_dir()).join("imports")
}

fn app_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join("receiptkeep")
}

pub fn normalize_path_option(value: Option<PathBuf>) -> Option<PathBuf> {
    let value = value?;
    if value.as_os_str().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl CliConfig {
    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        let mut config = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
        config.normalize();
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    /// Database path from the flag, then the environment, then this config
    pub fn resolve_db_path(&self, explicit: Option<PathBuf>) -> PathBuf {
        normalize_path_option(explicit)
            .or_else(|| normalize_path_option(std::env::var_os(DB_PATH_ENV).map(PathBuf::from)))
            .or_else(|| self.db_path.clone())
            .unwrap_or_else(default_db_path)
    }

    pub fn resolve_work_dir(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(default_work_dir)
    }

    fn normalize(&mut self) {
        self.db_path = normalize_path_option(self.db_path.take());
        self.work_dir = normalize_path_option(self.work_dir.take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn normalize_path_option_rejects_empty() {
        assert_eq!(normalize_path_option(None), None);
        assert_eq!(normalize_path_option(Some(PathBuf::new())), None);
    }

    #[test]
    fn missing_config_loads_defaults() {
        let tmp = tempdir().unwrap();
        let config = CliConfig::load_from_path(&tmp.path().join("absent.json")).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.default_merge_mode, MergeMode::Reconcile);
    }

    #[test]
    fn fresh_config_is_written_with_current_version() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        assert_eq!(CliConfig::default().version, 1);

        CliConfig::default().save_to_path(&path).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["version"], 1);
        assert_eq!(CliConfig::load_from_path(&path).unwrap().version, 1);
    }

    #[test]
    fn config_roundtrip_preserves_settings() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested").join(CONFIG_FILE_NAME);

        let config = CliConfig {
            version: 1,
            db_path: Some(PathBuf::from("/data/receiptkeep.db")),
            work_dir: Some(PathBuf::new()),
            default_merge_mode: MergeMode::Overwrite,
        };

        config.save_to_path(&path).unwrap();
        let loaded = CliConfig::load_from_path(&path).unwrap();

        assert_eq!(loaded.db_path, Some(PathBuf::from("/data/receiptkeep.db")));
        assert_eq!(loaded.work_dir, None);
        assert_eq!(loaded.default_merge_mode, MergeMode::Overwrite);
    }

    #[test]
    fn invalid_config_reports_path() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();

        let error = CliConfig::load_from_path(&path).unwrap_err();
        assert!(error.contains("Failed to parse config"));
    }

    #[test]
    fn explicit_db_path_wins() {
        let config = CliConfig {
            db_path: Some(PathBuf::from("/from/config.db")),
            ..CliConfig::default()
        };
        assert_eq!(
            config.resolve_db_path(Some(PathBuf::from("/from/flag.db"))),
            PathBuf::from("/from/flag.db")
        );
    }
}
