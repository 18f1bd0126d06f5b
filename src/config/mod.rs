//! Configuration loading and management for the Billable Hours Engine.
//!
//! Settings live in a small YAML file and are exposed to the engine through
//! the [`SettingsProvider`] trait, which is consulted on every calculation.
//!
//! # Example
//!
//! ```no_run
//! use billable_hours_engine::config::{FileSettingsStore, SettingsProvider};
//!
//! let store = FileSettingsStore::new("./config/settings.yaml");
//! let rounding = store.rounding_config().unwrap();
//! println!("Rounding {} ({})", rounding.enabled, rounding.method);
//! ```

mod loader;
mod provider;
mod types;

pub use loader::SettingsLoader;
pub use provider::{FileSettingsStore, InMemorySettings, SettingsProvider, StaticSettings};
pub use types::{EngineSettings, RoundingSettings};
