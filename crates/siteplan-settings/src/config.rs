//! Editor configuration for Siteplan
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats stored in the platform config directory.
//!
//! Configuration is organized into sections:
//! - Interaction tuning (snap radius, click slop, handle size)
//! - View tuning (pixels per meter, fit padding, zoom step, ground size)
//! - Scatter limits (point and attempt caps)

use serde::{Deserialize, Serialize};
use siteplan_core::tuning::{InteractionSettings, ScatterLimits, ViewSettings};
use std::path::{Path, PathBuf};

use crate::error::{SettingsError, SettingsResult};

/// File name of the default configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory under the platform config dir.
pub const APP_DIR_NAME: &str = "siteplan";

/// Supported configuration file formats, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// Complete editor configuration
///
/// Missing sections and keys fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Optional JSON file with scatter presets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset_catalog: Option<PathBuf>,
    /// Recently opened snapshots, most recent first
    pub recent_snapshots: Vec<PathBuf>,
    /// Number of recent snapshots to keep
    pub recent_snapshots_count: usize,
    /// Pointer interaction tuning
    pub interaction: InteractionSettings,
    /// View transform tuning
    pub view: ViewSettings,
    /// Scatter density caps
    pub scatter: ScatterLimits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preset_catalog: None,
            recent_snapshots: Vec::new(),
            recent_snapshots_count: 10,
            interaction: InteractionSettings::default(),
            view: ViewSettings::default(),
            scatter: ScatterLimits::default(),
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML), creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let format = ConfigFormat::from_path(path)?;

        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        let io_error = |source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        std::fs::write(path, content).map_err(io_error)?;
        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Loads `path` when given. Without a path the default location is
    /// used, and a missing default file yields the defaults.
    pub fn load_or_default(path: Option<&Path>) -> SettingsResult<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }
        let default_path = default_config_path()?;
        if default_path.exists() {
            Self::load_from_file(&default_path)
        } else {
            tracing::debug!("No config at {}, using defaults", default_path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let i = &self.interaction;
        positive("interaction.snap_radius_px", i.snap_radius_px)?;
        non_negative("interaction.click_slop_px", i.click_slop_px)?;
        positive("interaction.handle_radius_px", i.handle_radius_px)?;
        positive("interaction.polyline_stroke_px", i.polyline_stroke_px)?;
        non_negative("interaction.min_rectangle_size", i.min_rectangle_size)?;

        let v = &self.view;
        positive("view.base_pixels_per_meter", v.base_pixels_per_meter)?;
        non_negative("view.fit_padding_px", v.fit_padding_px)?;
        positive("view.ground_width_m", v.ground_width_m)?;
        positive("view.ground_depth_m", v.ground_depth_m)?;
        if !(v.zoom_step.is_finite() && v.zoom_step > 1.0) {
            return Err(SettingsError::invalid("view.zoom_step", "must be greater than 1"));
        }

        let s = &self.scatter;
        if s.max_points == 0 {
            return Err(SettingsError::invalid("scatter.max_points", "must be > 0"));
        }
        if s.max_attempts == 0 || s.attempts_per_point == 0 {
            return Err(SettingsError::invalid(
                "scatter.max_attempts",
                "attempt limits must be > 0",
            ));
        }
        non_negative("scatter.min_polygon_area", s.min_polygon_area)?;

        Ok(())
    }

    /// Sets one value by dotted key, e.g. `interaction.snap_radius_px`.
    /// The config is left unchanged if the result does not validate.
    pub fn set_value(&mut self, key: &str, value: &str) -> SettingsResult<()> {
        let mut updated = self.clone();
        match key {
            "interaction.snap_radius_px" => updated.interaction.snap_radius_px = parse(key, value)?,
            "interaction.click_slop_px" => updated.interaction.click_slop_px = parse(key, value)?,
            "interaction.handle_radius_px" => {
                updated.interaction.handle_radius_px = parse(key, value)?
            }
            "interaction.polyline_stroke_px" => {
                updated.interaction.polyline_stroke_px = parse(key, value)?
            }
            "interaction.min_rectangle_size" => {
                updated.interaction.min_rectangle_size = parse(key, value)?
            }
            "view.base_pixels_per_meter" => updated.view.base_pixels_per_meter = parse(key, value)?,
            "view.fit_padding_px" => updated.view.fit_padding_px = parse(key, value)?,
            "view.zoom_step" => updated.view.zoom_step = parse(key, value)?,
            "view.ground_width_m" => updated.view.ground_width_m = parse(key, value)?,
            "view.ground_depth_m" => updated.view.ground_depth_m = parse(key, value)?,
            "scatter.max_points" => updated.scatter.max_points = parse(key, value)?,
            "scatter.max_attempts" => updated.scatter.max_attempts = parse(key, value)?,
            "scatter.attempts_per_point" => updated.scatter.attempts_per_point = parse(key, value)?,
            "scatter.min_polygon_area" => updated.scatter.min_polygon_area = parse(key, value)?,
            "preset_catalog" => updated.preset_catalog = Some(PathBuf::from(value)),
            _ => return Err(SettingsError::UnknownKey(key.to_string())),
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Add a snapshot to the recent list
    pub fn add_recent_snapshot(&mut self, path: PathBuf) {
        self.recent_snapshots.retain(|f| f != &path);
        self.recent_snapshots.insert(0, path);
        self.recent_snapshots.truncate(self.recent_snapshots_count);
    }
}

/// `<platform config dir>/siteplan/config.toml`
pub fn default_config_path() -> SettingsResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or_else(|| {
            SettingsError::ConfigDirectory("no config directory on this platform".to_string())
        })
}

fn positive(key: &str, value: f64) -> SettingsResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SettingsError::invalid(key, format!("must be > 0, got {}", value)))
    }
}

fn non_negative(key: &str, value: f64) -> SettingsResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SettingsError::invalid(key, format!("must be >= 0, got {}", value)))
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> SettingsResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SettingsError::invalid(key, format!("cannot parse {:?}", value)))
}
