//! View transform for the planning canvas.
//!
//! Maps world coordinates (meters) to screen pixels and back, and owns the
//! zoom and pan state. Both spaces are y-down.
//!
//! Formula:
//! ```text
//! render_scale = scale * base_pixels_per_meter
//! center       = max(0, (viewport - content * render_scale) / 2)   per axis
//! screen       = center + (world + offset) * render_scale
//! ```
//! The centering term keeps the ground stage in the middle of the viewport
//! while it is smaller than the viewport.

use std::fmt;

use siteplan_core::constants::{MAX_ZOOM_FACTOR, MIN_ZOOM_FACTOR};
use siteplan_core::tuning::ViewSettings;

use crate::model::Point;

/// Supplies the content bounds (ground width x depth in meters) the view
/// fits to.
pub trait GroundSizeProvider {
    fn ground_size(&self) -> (f64, f64);
}

/// Fixed ground size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedGround {
    pub width_m: f64,
    pub depth_m: f64,
}

impl Default for FixedGround {
    fn default() -> Self {
        let settings = ViewSettings::default();
        Self {
            width_m: settings.ground_width_m,
            depth_m: settings.ground_depth_m,
        }
    }
}

impl GroundSizeProvider for FixedGround {
    fn ground_size(&self) -> (f64, f64) {
        (self.width_m, self.depth_m)
    }
}

/// Zoom and pan state plus the sizes it depends on.
#[derive(Debug, Clone)]
pub struct ViewTransform {
    scale: f64,
    offset: Point,
    viewport_width: f64,
    viewport_height: f64,
    content_width: f64,
    content_height: f64,
    base_pixels_per_meter: f64,
    zoom_step: f64,
    fit_padding: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(&ViewSettings::default())
    }
}

impl ViewTransform {
    pub fn new(settings: &ViewSettings) -> Self {
        Self {
            scale: 1.0,
            offset: Point::default(),
            viewport_width: 0.0,
            viewport_height: 0.0,
            content_width: positive_or(settings.ground_width_m, 1.0),
            content_height: positive_or(settings.ground_depth_m, 1.0),
            base_pixels_per_meter: positive_or(settings.base_pixels_per_meter, 1.0),
            zoom_step: if settings.zoom_step.is_finite() && settings.zoom_step > 1.0 {
                settings.zoom_step
            } else {
                1.2
            },
            fit_padding: non_negative_or_zero(settings.fit_padding_px),
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Scale that fits the content into the current viewport with the last
    /// used padding. Follows viewport and content size changes.
    pub fn fit_scale(&self) -> f64 {
        self.fit_scale_for(self.fit_padding)
    }

    fn fit_scale_for(&self, padding: f64) -> f64 {
        let available_w = self.viewport_width - 2.0 * padding;
        let available_h = self.viewport_height - 2.0 * padding;
        let sx = available_w / (self.content_width * self.base_pixels_per_meter);
        let sy = available_h / (self.content_height * self.base_pixels_per_meter);
        let fit = sx.min(sy);
        if fit.is_finite() && fit > 0.0 {
            fit
        } else {
            1.0
        }
    }

    pub fn viewport_size(&self) -> (f64, f64) {
        (self.viewport_width, self.viewport_height)
    }

    pub fn content_size(&self) -> (f64, f64) {
        (self.content_width, self.content_height)
    }

    /// Pixels per world meter at the current zoom.
    pub fn render_scale(&self) -> f64 {
        self.scale * self.base_pixels_per_meter
    }

    /// Allowed scale range relative to the current fit scale.
    pub fn zoom_limits(&self) -> (f64, f64) {
        let fit = self.fit_scale();
        (fit * MIN_ZOOM_FACTOR, fit * MAX_ZOOM_FACTOR)
    }

    /// Sets the viewport (canvas) size in pixels, typically on host resize.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport_width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        self.viewport_height = if height.is_finite() { height.max(0.0) } else { 0.0 };
    }

    /// Sets the content (ground) size in meters.
    pub fn set_content_size(&mut self, width_m: f64, depth_m: f64) {
        self.content_width = positive_or(width_m, 1.0);
        self.content_height = positive_or(depth_m, 1.0);
    }

    pub fn apply_ground(&mut self, provider: &dyn GroundSizeProvider) {
        let (width, depth) = provider.ground_size();
        self.set_content_size(width, depth);
    }

    /// Restores a persisted transform. Non-positive scales fall back to 1.0.
    pub fn restore(&mut self, scale: f64, offset: Point) {
        self.scale = positive_or(scale, 1.0);
        self.offset = if offset.is_finite() {
            offset
        } else {
            Point::default()
        };
    }

    pub fn set_offset(&mut self, offset: Point) {
        if offset.is_finite() {
            self.offset = offset;
        }
    }

    fn center_for(&self, render_scale: f64) -> Point {
        Point::new(
            ((self.viewport_width - self.content_width * render_scale) / 2.0).max(0.0),
            ((self.viewport_height - self.content_height * render_scale) / 2.0).max(0.0),
        )
    }

    /// Screen position of the world origin before the offset is applied.
    pub fn center(&self) -> Point {
        self.center_for(self.render_scale())
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        let rs = self.render_scale();
        self.center() + (world + self.offset) * rs
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        let rs = self.render_scale();
        (screen - self.center()) * (1.0 / rs) - self.offset
    }

    /// Converts a screen distance (pixels) to world units.
    pub fn screen_to_world_distance(&self, pixels: f64) -> f64 {
        pixels / self.render_scale()
    }

    /// Fits the whole content inside the viewport minus `padding` on every
    /// side and resets the offset. Returns the new scale.
    ///
    /// Degenerate viewport or content sizes fall back to scale 1.0.
    pub fn fit_to_content(&mut self, padding: f64) -> f64 {
        self.fit_padding = non_negative_or_zero(padding);
        let fit = self.fit_scale();
        self.scale = fit;
        self.offset = Point::default();
        tracing::debug!("Fit view to content: scale {:.4}", fit);
        fit
    }

    /// Zooms to `next_scale` (clamped to the zoom limits) while keeping the
    /// world point under `anchor` at the same screen position. Returns the
    /// applied scale.
    pub fn zoom_at_anchor(&mut self, next_scale: f64, anchor: Point) -> f64 {
        if !next_scale.is_finite() || next_scale <= 0.0 || !anchor.is_finite() {
            return self.scale;
        }
        let (min, max) = self.zoom_limits();
        let clamped = next_scale.clamp(min, max);

        let world = self.screen_to_world(anchor);
        self.scale = clamped;
        let rs = self.render_scale();
        let center = self.center_for(rs);
        self.offset = (anchor - center) * (1.0 / rs) - world;
        clamped
    }

    pub fn zoom_in_at(&mut self, anchor: Point) -> f64 {
        self.zoom_at_anchor(self.scale * self.zoom_step, anchor)
    }

    pub fn zoom_out_at(&mut self, anchor: Point) -> f64 {
        self.zoom_at_anchor(self.scale / self.zoom_step, anchor)
    }

    /// Pans by a screen-space delta.
    pub fn pan_by_screen(&mut self, dx: f64, dy: f64) {
        let rs = self.render_scale();
        self.set_offset(self.offset + Point::new(dx, dy) * (1.0 / rs));
    }
}

impl fmt::Display for ViewTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scale: {:.3}x | Offset: ({:.1}, {:.1})",
            self.scale, self.offset.x, self.offset.y
        )
    }
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

fn non_negative_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}
