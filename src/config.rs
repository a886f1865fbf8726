//! Config file
//!
//! Stored as TOML at `$XDG_CONFIG_HOME/keyglow/config.toml`. A missing file
//! is created with defaults on first load.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::color::Color;
use crate::driver::DriverConfig;
use crate::effects::EffectConfig;
use crate::error::{Error, Result};
use crate::scheduler::{SchedulerConfig, DEFAULT_INTERVAL_MS};

/// Config file name inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Color of idle keys
    pub background: Color,
    pub scheduler_interval_ms: u64,
    pub detector_interval_ms: u64,
    pub driver_interval_ms: u64,
    pub effect: EffectConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            background: Color::GRAY,
            scheduler_interval_ms: DEFAULT_INTERVAL_MS,
            detector_interval_ms: DEFAULT_INTERVAL_MS,
            driver_interval_ms: DEFAULT_INTERVAL_MS,
            effect: EffectConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        let io_err = |source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, self.to_toml()?).map_err(io_err)
    }

    /// Load the default config file, writing defaults if it does not exist
    pub fn load_default() -> Result<Self> {
        Self::load_or_init(&default_config_path())
    }

    pub fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            Self::default().save(path)?;
            info!("Created default config: {}", path.display());
        }
        Self::load(path)
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            interval: Duration::from_millis(self.scheduler_interval_ms.max(1)),
            background: self.background,
        }
    }

    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            interval: Duration::from_millis(self.driver_interval_ms.max(1)),
            detector_interval: Duration::from_millis(self.detector_interval_ms.max(1)),
        }
    }
}

/// Default config file location
pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

fn config_dir() -> PathBuf {
    if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(config).join("keyglow")
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".config/keyglow")
    } else {
        PathBuf::from("/tmp/keyglow")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::RainbowConfig;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::from_toml("background = \"#102030\"\n").unwrap();
        assert_eq!(config.background, Color::new(0x10, 0x20, 0x30));
        assert_eq!(config.driver_interval_ms, 25);
        assert_eq!(config.effect, EffectConfig::default());
    }

    #[test]
    fn test_effect_table() {
        let config = Config::from_toml(
            r#"
            background = "black"

            [effect]
            kind = "rainbow"
            hue_center = 200.0
            "#,
        )
        .unwrap();
        assert_eq!(
            config.effect,
            EffectConfig::Rainbow(RainbowConfig {
                hue_center: 200.0,
                ..Default::default()
            })
        );
        assert_eq!(config.scheduler_config().background, Color::BLACK);
    }

    #[test]
    fn test_bad_color_rejected() {
        assert!(matches!(
            Config::from_toml("background = \"not-a-color\""),
            Err(Error::ConfigParse(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = Config {
            background: Color::BLUE,
            driver_interval_ms: 40,
            effect: EffectConfig::from_name("ripple").unwrap(),
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_or_init_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        assert_eq!(Config::load_or_init(&path).unwrap(), Config::default());
        assert!(path.exists());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::load(&dir.path().join("absent.toml")),
            Err(Error::ConfigIo { .. })
        ));
    }
}
