//! Settings file loading.
//!
//! This module provides the [`SettingsLoader`] type for loading engine
//! settings from a YAML file.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::EngineSettings;

/// Loads engine settings from YAML.
///
/// # Example
///
/// ```no_run
/// use billable_hours_engine::config::SettingsLoader;
///
/// let settings = SettingsLoader::load("./config/settings.yaml").unwrap();
/// println!("Rounding enabled: {}", settings.rounding.enabled);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SettingsLoader;

impl SettingsLoader {
    /// Loads settings from the file at `path`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::ConfigNotFound`] if the file cannot be read.
    /// - [`EngineError::ConfigParseError`] if it is not valid settings YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<EngineSettings> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::parse(&content).map_err(|message| EngineError::ConfigParseError {
            path: path_str,
            message,
        })
    }

    /// Parses settings from a YAML string.
    ///
    /// An empty document yields the default settings.
    pub fn from_yaml_str(content: &str) -> EngineResult<EngineSettings> {
        Self::parse(content).map_err(|message| EngineError::ConfigParseError {
            path: "<inline>".to_string(),
            message,
        })
    }

    fn parse(content: &str) -> Result<EngineSettings, String> {
        if content.trim().is_empty() {
            return Ok(EngineSettings::default());
        }
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }
}
