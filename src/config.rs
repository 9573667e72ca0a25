use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

fn default_speed() -> f64 {
    10.0
}

fn default_autosave_interval_secs() -> u64 {
    30
}

fn default_save_path() -> PathBuf {
    PathBuf::from("saves/village.save")
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub name: String,
    pub seed: u64,
    /// Ticks per second of game time.
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default = "default_autosave_interval_secs")]
    pub autosave_interval_secs: u64,
    #[serde(default = "default_save_path")]
    pub save_path: PathBuf,
}

impl GameConfig {
    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(600)
    }

    pub fn autosave_interval_ticks(&self) -> u64 {
        (self.autosave_interval_secs as f64 * self.speed).round() as u64
    }
}

pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<GameConfig> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: GameConfig = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_fills_defaults() {
        let config: GameConfig =
            serde_yaml::from_str("name: test\nseed: 1\n").expect("minimal config parses");
        assert_eq!(config.speed, 10.0);
        assert_eq!(config.autosave_interval_secs, 30);
        assert_eq!(config.autosave_interval_ticks(), 300);
        assert_eq!(config.ticks(None), 600);
        assert_eq!(config.ticks(Some(5)), 5);
    }

    #[test]
    fn autosave_interval_scales_with_speed() {
        let config: GameConfig =
            serde_yaml::from_str("name: test\nseed: 1\nspeed: 2\n").expect("config parses");
        assert_eq!(config.autosave_interval_ticks(), 60);
    }
}
