use crate::model::DragTuning;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = ".csv-prompt-tui";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the prompt CSV files
    pub library_dir: PathBuf,
    /// Directory scanned for wildcard `.txt`/`.yaml` files
    pub wildcard_dir: PathBuf,
    /// Directories searched for model files, in order
    pub model_dirs: Vec<PathBuf>,
    /// Drag tuning; `row_height` is in terminal cells
    pub drag: DragTuning,
    /// Default tracing filter, overridden by `RUST_LOG`
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        let base = Self::config_dir().unwrap_or_else(|| PathBuf::from(APP_DIR));
        Self {
            library_dir: base.join("csv"),
            wildcard_dir: base.join("wildcards"),
            model_dirs: vec![base.join("models")],
            drag: DragTuning::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn config_dir() -> Option<PathBuf> {
        let home = env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(APP_DIR))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    pub fn load() -> Option<Config> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }

        let contents = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("Invalid config {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Load the config, writing the defaults when no file exists yet
    pub fn load_or_default() -> Config {
        if let Some(config) = Self::load() {
            return config;
        }

        let config = Config::default();
        let missing = Self::config_path().is_some_and(|p| !p.exists());
        if missing {
            if let Err(e) = config.save() {
                tracing::warn!("Failed to write default config: {}", e);
            }
        }
        config
    }

    /// Save the config to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        // Create config directory if it doesn't exist
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{"library_dir": "/data/csv", "drag": {"row_height": 2.0}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.library_dir, PathBuf::from("/data/csv"));
        assert_eq!(config.drag.row_height, 2.0);
        assert_eq!(config.drag.snap_enter, 0.15);
        assert_eq!(config.drag.snap_exit, 0.65);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = Config::default();
        config.model_dirs = vec![PathBuf::from("/models/loras")];
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), Some(config));
    }

    #[test]
    fn test_invalid_config_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Config::load_from(&path), None);
    }
}
