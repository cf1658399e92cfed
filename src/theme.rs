//! Colour theme preference.
//!
//! The preference is persisted in the client config under the `theme` key.
//! `System` defers to whatever the host reports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User-selected theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    /// Always light.
    Light,
    /// Always dark.
    Dark,
    /// Follow the host appearance.
    #[default]
    System,
}

/// Effective theme after resolving [`ThemePreference::System`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveTheme {
    /// Light appearance.
    Light,
    /// Dark appearance.
    Dark,
}

impl ThemePreference {
    /// Resolve to a concrete theme given whether the host prefers dark.
    pub fn resolve(self, system_is_dark: bool) -> EffectiveTheme {
        match self {
            Self::Light => EffectiveTheme::Light,
            Self::Dark => EffectiveTheme::Dark,
            Self::System if system_is_dark => EffectiveTheme::Dark,
            Self::System => EffectiveTheme::Light,
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
            Self::System => write!(f, "system"),
        }
    }
}

impl FromStr for ThemePreference {
    type Err = crate::WatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => Err(crate::WatchError::Config(format!(
                "unknown theme '{other}', expected light, dark or system"
            ))),
        }
    }
}
