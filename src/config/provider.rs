//! Settings providers.
//!
//! Rounding settings are process-wide but mutable, so they are never cached:
//! every calculation asks its [`SettingsProvider`] afresh.

use std::path::PathBuf;
use std::sync::RwLock;

use crate::calculation::{RoundingConfig, RoundingMethod};
use crate::error::{EngineError, EngineResult};

use super::loader::SettingsLoader;
use super::types::{EngineSettings, RoundingSettings};

/// Source of the rounding settings.
pub trait SettingsProvider: Send + Sync {
    /// Whether half-hour rounding is switched on.
    fn rounding_enabled(&self) -> EngineResult<bool>;

    /// The configured rounding method, as stored.
    fn rounding_method(&self) -> EngineResult<String>;

    /// Reads both settings and resolves the method, falling back to `nearest`.
    fn rounding_config(&self) -> EngineResult<RoundingConfig> {
        Ok(RoundingConfig {
            enabled: self.rounding_enabled()?,
            method: RoundingMethod::from_setting(&self.rounding_method()?),
        })
    }
}

/// Fixed settings, for tests and embedded use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticSettings {
    rounding: RoundingSettings,
}

impl StaticSettings {
    /// Settings with the given rounding switch and raw method string.
    pub fn new(enabled: bool, method: impl Into<String>) -> Self {
        Self {
            rounding: RoundingSettings {
                enabled,
                method: method.into(),
            },
        }
    }

    /// Settings with rounding switched off.
    pub fn disabled() -> Self {
        Self {
            rounding: RoundingSettings::default(),
        }
    }
}

impl SettingsProvider for StaticSettings {
    fn rounding_enabled(&self) -> EngineResult<bool> {
        Ok(self.rounding.enabled)
    }

    fn rounding_method(&self) -> EngineResult<String> {
        Ok(self.rounding.method.clone())
    }
}

/// Settings held in memory that can be changed while the engine runs.
#[derive(Debug, Default)]
pub struct InMemorySettings {
    settings: RwLock<EngineSettings>,
}

impl InMemorySettings {
    /// Wraps an initial set of settings.
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }

    /// Switches rounding on or off.
    pub fn set_rounding_enabled(&self, enabled: bool) -> EngineResult<()> {
        self.write()?.rounding.enabled = enabled;
        Ok(())
    }

    /// Replaces the stored rounding method string.
    pub fn set_rounding_method(&self, method: impl Into<String>) -> EngineResult<()> {
        self.write()?.rounding.method = method.into();
        Ok(())
    }

    fn read(&self) -> EngineResult<std::sync::RwLockReadGuard<'_, EngineSettings>> {
        self.settings.read().map_err(|_| EngineError::StoreError {
            message: "settings lock poisoned".to_string(),
        })
    }

    fn write(&self) -> EngineResult<std::sync::RwLockWriteGuard<'_, EngineSettings>> {
        self.settings.write().map_err(|_| EngineError::StoreError {
            message: "settings lock poisoned".to_string(),
        })
    }
}

impl SettingsProvider for InMemorySettings {
    fn rounding_enabled(&self) -> EngineResult<bool> {
        Ok(self.read()?.rounding.enabled)
    }

    fn rounding_method(&self) -> EngineResult<String> {
        Ok(self.read()?.rounding.method.clone())
    }

    fn rounding_config(&self) -> EngineResult<RoundingConfig> {
        let settings = self.read()?;
        Ok(RoundingConfig {
            enabled: settings.rounding.enabled,
            method: RoundingMethod::from_setting(&settings.rounding.method),
        })
    }
}

/// Settings read from a YAML file on every lookup.
///
/// Edits to the file take effect on the next calculation without a restart.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    /// Creates a store reading from `path`. The file is not read until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> EngineResult<EngineSettings> {
        SettingsLoader::load(&self.path)
    }
}

impl SettingsProvider for FileSettingsStore {
    fn rounding_enabled(&self) -> EngineResult<bool> {
        Ok(self.load()?.rounding.enabled)
    }

    fn rounding_method(&self) -> EngineResult<String> {
        Ok(self.load()?.rounding.method)
    }

    fn rounding_config(&self) -> EngineResult<RoundingConfig> {
        let settings = self.load()?;
        Ok(RoundingConfig {
            enabled: settings.rounding.enabled,
            method: RoundingMethod::from_setting(&settings.rounding.method),
        })
    }
}
