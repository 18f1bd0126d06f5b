//! Configuration types for the Billable Hours Engine.
//!
//! This module contains the settings structures deserialized from the
//! YAML settings file.

use serde::{Deserialize, Serialize};

/// Rounding section of the settings file.
///
/// The method is kept as the raw string from the file so an unknown value
/// can be reported and replaced at lookup time instead of failing the load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingSettings {
    /// Whether half-hour rounding is applied.
    #[serde(default)]
    pub enabled: bool,
    /// One of `up`, `down` or `nearest`.
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "nearest".to_string()
}

impl Default for RoundingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            method: default_method(),
        }
    }
}

/// The complete engine settings file.
///
/// ```text
/// rounding:
///   enabled: true
///   method: nearest
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Rounding settings.
    #[serde(default)]
    pub rounding: RoundingSettings,
}
