//! Application directory paths.
//!
//! Uses the [`dirs`] crate for platform-appropriate resolution.
//! `TRENDWATCH_CONFIG_DIR` overrides the config directory for tests and
//! custom deployments.

use std::path::PathBuf;

/// Application config directory.
///
/// Resolves to `dirs::config_dir()/trendwatch/` by default.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("TRENDWATCH_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    ::dirs::config_dir()
        .map(|d| d.join("trendwatch"))
        .unwrap_or_else(|| PathBuf::from("/tmp/trendwatch-config"))
}

/// Main config file (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}
