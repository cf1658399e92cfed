//! Configuration for the dashboard client.
//!
//! Loaded from `config.toml` in [`crate::dirs::config_dir`]. Every field has a
//! default, so a missing file or a partial file is fine.

use crate::theme::ThemePreference;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use trendwatch_api::ApiConfig;

/// Top-level client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Preferred colour theme.
    pub theme: ThemePreference,
    /// Analysis service connection settings.
    pub api: ApiConfig,
    /// Refresh scheduling settings.
    pub schedule: ScheduleConfig,
}

/// Refresh scheduling configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Delay before re-polling when the computed refresh time has already
    /// passed.
    pub catch_up_delay_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            catch_up_delay_secs: 30,
        }
    }
}

impl ScheduleConfig {
    /// The catch-up delay as a [`Duration`].
    pub fn catch_up_delay(&self) -> Duration {
        Duration::from_secs(self.catch_up_delay_secs)
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| crate::WatchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise return defaults.
    pub fn load_or_default(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| crate::WatchError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `<config dir>/config.toml`.
    pub fn default_config_path() -> PathBuf {
        crate::dirs::config_file()
    }

    /// Check values that parse fine but cannot work.
    pub fn validate(&self) -> crate::Result<()> {
        self.api
            .validate()
            .map_err(|e| crate::WatchError::Config(e.to_string()))?;
        if self.schedule.catch_up_delay_secs == 0 {
            return Err(crate::WatchError::Config(
                "schedule.catch_up_delay_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
