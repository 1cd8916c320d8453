//! Tunable parameters shared by the editor engine and the settings layer.
//!
//! These structs are plain serde data so the settings crate can embed them in
//! its configuration file and the designer can consume them directly.

use serde::{Deserialize, Serialize};

use crate::constants::{BASE_PIXELS_PER_METER, DEFAULT_GROUND_SIZE_METERS, MIN_RECTANGLE_SIZE, VIEW_PADDING, ZOOM_STEP};

/// Pointer interaction tuning (all distances in screen pixels unless noted).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionSettings {
    /// Radius around a polyline endpoint that continues the line.
    pub snap_radius_px: f64,
    /// Pointer travel below which a press/release pair counts as a click.
    pub click_slop_px: f64,
    /// Hit radius of vertex, resize and marker handles.
    pub handle_radius_px: f64,
    /// Visible polyline stroke width used for hit-testing.
    pub polyline_stroke_px: f64,
    /// Minimum rectangle width/height in world units.
    pub min_rectangle_size: f64,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            snap_radius_px: 12.0,
            click_slop_px: 4.0,
            handle_radius_px: 8.0,
            polyline_stroke_px: 6.0,
            min_rectangle_size: MIN_RECTANGLE_SIZE,
        }
    }
}

/// View transform tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub base_pixels_per_meter: f64,
    pub fit_padding_px: f64,
    pub zoom_step: f64,
    /// Ground width (x) in meters used when no provider is attached.
    pub ground_width_m: f64,
    /// Ground depth (y) in meters used when no provider is attached.
    pub ground_depth_m: f64,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            base_pixels_per_meter: BASE_PIXELS_PER_METER,
            fit_padding_px: VIEW_PADDING,
            zoom_step: ZOOM_STEP,
            ground_width_m: DEFAULT_GROUND_SIZE_METERS,
            ground_depth_m: DEFAULT_GROUND_SIZE_METERS,
        }
    }
}

/// Caps applied by the scatter density engine.
///
/// The defaults are tuned for interactive preview; a final conversion pass may
/// use [`ScatterLimits::unbounded_preview`] or its own values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterLimits {
    pub max_points: usize,
    pub max_attempts: usize,
    pub attempts_per_point: usize,
    /// Polygons smaller than this (square meters) get no scatter.
    pub min_polygon_area: f64,
}

impl ScatterLimits {
    /// Attempt ceiling of [`ScatterLimits::unbounded_preview`].
    pub const FINAL_PASS_MAX_ATTEMPTS: usize = 250_000;

    /// Limits with the point cap lifted. Attempts still scale with the target
    /// and stop at [`Self::FINAL_PASS_MAX_ATTEMPTS`].
    pub fn unbounded_preview() -> Self {
        Self {
            max_points: usize::MAX,
            max_attempts: Self::FINAL_PASS_MAX_ATTEMPTS,
            ..Self::default()
        }
    }
}

impl Default for ScatterLimits {
    fn default() -> Self {
        Self {
            max_points: 800,
            max_attempts: 60_000,
            attempts_per_point: 140,
            min_polygon_area: 60.0,
        }
    }
}
