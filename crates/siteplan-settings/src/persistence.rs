//! Settings Persistence
//!
//! Pairs a [`Config`] with the file it was loaded from so edits and
//! command-line overrides can be written back to the same place.

use crate::config::{default_config_path, Config};
use crate::error::{SettingsError, SettingsResult};
use std::path::{Path, PathBuf};

/// Settings persistence layer
#[derive(Debug, Clone)]
pub struct SettingsPersistence {
    config: Config,
    path: PathBuf,
}

impl SettingsPersistence {
    /// Default config bound to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            config: Config::default(),
            path: path.into(),
        }
    }

    /// Load settings from `path`, or from the default location when `None`.
    /// A missing default file yields the defaults bound to that location.
    pub fn load(path: Option<&Path>) -> SettingsResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => default_config_path()?,
        };
        let config = if path.exists() {
            Config::load_from_file(&path)?
        } else {
            tracing::debug!("No settings at {}, using defaults", path.display());
            Config::default()
        };
        Ok(Self { config, path })
    }

    /// Save settings to the bound file
    pub fn save(&self) -> SettingsResult<()> {
        self.config.save_to_file(&self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get reference to config
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable reference to config
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Applies `key=value` overrides in order. Stops at the first bad entry;
    /// entries before it stay applied.
    pub fn apply_overrides<S: AsRef<str>>(&mut self, overrides: &[S]) -> SettingsResult<()> {
        for entry in overrides {
            let entry = entry.as_ref();
            let (key, value) = entry.split_once('=').ok_or_else(|| {
                SettingsError::invalid(entry, "expected key=value")
            })?;
            self.config.set_value(key.trim(), value)?;
            tracing::debug!("Override {} = {}", key.trim(), value.trim());
        }
        Ok(())
    }

    /// Validate settings
    pub fn validate(&self) -> SettingsResult<()> {
        self.config.validate()
    }
}
