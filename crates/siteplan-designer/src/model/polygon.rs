use siteplan_core::ids::{new_id, prefix};

use super::{Point, ScatterAssignment};
use crate::geometry::{self, Bounds};

/// A closed region on a layer (terrain patch, building footprint, lawn, pond...).
#[derive(Debug, Clone, PartialEq)]
pub struct PlanPolygon {
    pub id: String,
    pub name: String,
    pub layer_id: String,
    pub points: Vec<Point>,
    pub scatter: Option<ScatterAssignment>,
}

impl PlanPolygon {
    pub fn new(layer_id: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            id: new_id(prefix::POLYGON),
            name: "Polygon".to_string(),
            layer_id: layer_id.into(),
            points,
            scatter: None,
        }
    }

    /// Axis-aligned rectangle from two opposite corners, listed as
    /// `(min,min) (max,min) (max,max) (min,max)`.
    pub fn rectangle(layer_id: impl Into<String>, a: Point, b: Point) -> Self {
        let (min_x, max_x) = (a.x.min(b.x), a.x.max(b.x));
        let (min_y, max_y) = (a.y.min(b.y), a.y.max(b.y));
        let mut polygon = Self::new(
            layer_id,
            vec![
                Point::new(min_x, min_y),
                Point::new(max_x, min_y),
                Point::new(max_x, max_y),
                Point::new(min_x, max_y),
            ],
        );
        polygon.name = "Rectangle".to_string();
        polygon
    }

    pub fn area(&self) -> f64 {
        geometry::polygon_area(&self.points)
    }

    pub fn centroid(&self) -> Option<Point> {
        geometry::polygon_centroid(&self.points)
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.points)
    }

    pub fn contains(&self, p: Point) -> bool {
        geometry::point_in_polygon(p, &self.points)
    }

    pub fn translated(points: &[Point], delta: Point) -> Vec<Point> {
        points.iter().map(|p| *p + delta).collect()
    }
}
