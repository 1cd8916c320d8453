//! Planning data model: points, layers, polygons, polylines, scatter
//! assignments and reference images.

mod image;
mod layer;
mod polygon;
mod polyline;
mod scatter;

pub use image::{ImageFrame, PlanningImage};
pub use layer::{Layer, LayerKind, LayerParams};
pub use polygon::PlanPolygon;
pub use polyline::{PlanPolyline, Vertex, VertexId, VertexStore};
pub use scatter::ScatterAssignment;

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A position in world meters (or screen pixels, depending on context).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Linear interpolation towards `other` (`t = 0` is `self`).
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Reference to a selectable planning feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeatureRef {
    Polygon(String),
    Polyline(String),
    Image(String),
}

impl FeatureRef {
    pub fn id(&self) -> &str {
        match self {
            FeatureRef::Polygon(id) | FeatureRef::Polyline(id) | FeatureRef::Image(id) => id,
        }
    }
}
