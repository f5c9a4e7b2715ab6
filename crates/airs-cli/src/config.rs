//! Configuration management for the AIRS CLI.

use airs::prelude::{AirsConfig, ParallelConfig};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "airs.toml";

/// AIRS project configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub training: AirsConfig,
    #[serde(default)]
    pub parallel: ParallelSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Class column name; the last column when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_column: Option<String>,
    #[serde(default = "default_model_path")]
    pub model_path: String,
    /// Fraction of rows held out by `airs evaluate`.
    #[serde(default = "default_holdout")]
    pub holdout: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParallelSection {
    /// Train with AIRS2-Parallel instead of the sequential trainer.
    #[serde(default)]
    pub enabled: bool,
    #[serde(flatten)]
    pub settings: ParallelConfig,
}

// Default value functions
fn default_model_path() -> String { "airs-model.json".to_string() }
fn default_holdout() -> f64 { 0.3 }

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            class_column: None,
            model_path: default_model_path(),
            holdout: default_holdout(),
        }
    }
}

impl Config {
    /// Load config from airs.toml in the current or parent directories.
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Find airs.toml in current or parent directories.
fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use airs::prelude::{MergeMode, Variant};

    #[test]
    fn default_toml_round_trips() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(text.contains("[training]"));
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.training, AirsConfig::default());
        assert_eq!(parsed.parallel.settings, ParallelConfig::default());
        assert!(!parsed.parallel.enabled);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [data]
            class_column = "species"

            [training]
            variant = "airs1"
            k = 5

            [parallel]
            enabled = true
            threads = 4
            merge = "prune"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.data.class_column.as_deref(), Some("species"));
        assert_eq!(parsed.data.model_path, "airs-model.json");
        assert_eq!(parsed.training.variant, Variant::Airs1);
        assert_eq!(parsed.training.k, 5);
        assert_eq!(parsed.training.clonal_rate, 10.0);
        assert!(parsed.parallel.enabled);
        assert_eq!(parsed.parallel.settings.threads, 4);
        assert_eq!(parsed.parallel.settings.merge, MergeMode::Prune);
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut config = Config::default();
        config.training.seed = 99;
        config.save(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().training.seed, 99);
    }
}
