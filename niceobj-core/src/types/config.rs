//! NiceObjects project configuration
//!
//! Defines the optional `niceobj.json` file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the config file looked up next to the GameMaker project
pub const CONFIG_FILE_NAME: &str = "niceobj.json";

/// The main configuration file (niceobj.json)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Directory holding the human-editable files (default: "NiceObjects")
    #[serde(default = "default_human_dir")]
    pub human_dir: PathBuf,

    /// Keep the human directory when the watcher shuts down
    #[serde(default)]
    pub keep_human_dir: bool,

    /// Sync configuration
    #[serde(default)]
    pub sync: SyncConfig,
}

fn default_human_dir() -> PathBuf {
    PathBuf::from("NiceObjects")
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            human_dir: default_human_dir(),
            keep_human_dir: false,
            sync: SyncConfig::default(),
        }
    }
}

/// Error types for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl ProjectConfig {
    /// Load a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `niceobj.json` from `dir` if present, defaults otherwise
    pub fn load_or_default(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Timing and direction of the live sync
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// Sync mode
    #[serde(default)]
    pub mode: SyncMode,

    /// After acting on one side, ignore the other side for this long (ms)
    #[serde(default = "default_reverb_window_ms")]
    pub reverb_window_ms: u64,

    /// Ignore repeated writes to the same file within this long (ms)
    #[serde(default = "default_dedup_window_ms")]
    pub dedup_window_ms: u64,
}

fn default_reverb_window_ms() -> u64 {
    1000
}

fn default_dedup_window_ms() -> u64 {
    100
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            mode: SyncMode::default(),
            reverb_window_ms: default_reverb_window_ms(),
            dedup_window_ms: default_dedup_window_ms(),
        }
    }
}

impl SyncConfig {
    pub fn reverb_window(&self) -> Duration {
        Duration::from_millis(self.reverb_window_ms)
    }

    pub fn dedup_window(&self) -> Duration {
        Duration::from_millis(self.dedup_window_ms)
    }
}

/// Sync direction mode
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SyncMode {
    /// Only translate human edits into the GameMaker project
    Push,

    /// Only translate GameMaker edits into the human directory
    Pull,

    /// Both directions
    #[default]
    Bidirectional,
}

impl SyncMode {
    pub fn pushes(self) -> bool {
        matches!(self, SyncMode::Push | SyncMode::Bidirectional)
    }

    pub fn pulls(self) -> bool {
        matches!(self, SyncMode::Pull | SyncMode::Bidirectional)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProjectConfig::default();
        assert_eq!(config.human_dir, PathBuf::from("NiceObjects"));
        assert!(!config.keep_human_dir);
        assert_eq!(config.sync.reverb_window(), Duration::from_secs(1));
        assert_eq!(config.sync.dedup_window(), Duration::from_millis(100));
        assert_eq!(config.sync.mode, SyncMode::Bidirectional);
    }

    #[test]
    fn test_partial_config() {
        let json = r#"{ "humanDir": "gm_txt", "sync": { "dedupWindowMs": 250 } }"#;
        let config: ProjectConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.human_dir, PathBuf::from("gm_txt"));
        assert_eq!(config.sync.dedup_window_ms, 250);
        assert_eq!(config.sync.reverb_window_ms, 1000);
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProjectConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config, ProjectConfig::default());

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "keepHumanDir": true, "sync": { "mode": "pull" } }"#,
        )
        .unwrap();
        let config = ProjectConfig::load_or_default(dir.path()).unwrap();
        assert!(config.keep_human_dir);
        assert!(!config.sync.mode.pushes());
        assert!(config.sync.mode.pulls());
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ProjectConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
