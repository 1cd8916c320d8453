use siteplan_core::constants::MIN_IMAGE_SCALE;
use siteplan_core::ids::{new_id, prefix};

use super::Point;

/// Axis-aligned world-space frame an image occupies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageFrame {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl ImageFrame {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }
}

/// A reference raster overlaid on the plan. Geometry is `position` plus the
/// pixel size multiplied by a single uniform `scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanningImage {
    pub id: String,
    pub name: String,
    pub url: String,
    pub size_label: String,
    pub width: f64,
    pub height: f64,
    pub visible: bool,
    pub locked: bool,
    pub opacity: f64,
    pub position: Point,
    pub scale: f64,
    /// Registration point in image-local, unscaled coordinates.
    pub align_marker: Option<Point>,
}

impl PlanningImage {
    pub fn new(url: impl Into<String>, width: f64, height: f64) -> Self {
        let width = sanitize_extent(width);
        let height = sanitize_extent(height);
        Self {
            id: new_id(prefix::IMAGE),
            name: "Image".to_string(),
            url: url.into(),
            size_label: format!("{} x {}", width.round(), height.round()),
            width,
            height,
            visible: true,
            locked: false,
            opacity: 1.0,
            position: Point::default(),
            scale: 1.0,
            align_marker: None,
        }
    }

    pub fn frame(&self) -> ImageFrame {
        ImageFrame {
            x: self.position.x,
            y: self.position.y,
            w: self.width * self.scale,
            h: self.height * self.scale,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        self.frame().contains(p)
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = if opacity.is_nan() {
            1.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = if scale.is_finite() {
            scale.max(MIN_IMAGE_SCALE)
        } else {
            1.0
        };
    }

    /// World position to image-local unscaled coordinates.
    pub fn world_to_local(&self, p: Point) -> Point {
        (p - self.position) * (1.0 / self.scale)
    }

    pub fn local_to_world(&self, p: Point) -> Point {
        self.position + p * self.scale
    }

    /// Marker location in world space, if a marker is set.
    pub fn marker_world(&self) -> Option<Point> {
        self.align_marker.map(|m| self.local_to_world(m))
    }
}

fn sanitize_extent(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        1.0
    }
}
