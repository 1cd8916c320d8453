//! Siteplan Settings Crate
//!
//! Handles editor configuration: file formats, validation, the default
//! config location and command-line overrides.

pub mod config;
pub mod error;
pub mod persistence;

pub use config::{default_config_path, Config, ConfigFormat};
pub use error::{SettingsError, SettingsResult};
pub use persistence::SettingsPersistence;
