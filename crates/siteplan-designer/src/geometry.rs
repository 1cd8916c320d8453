//! Geometry kernel.
//!
//! Pure functions over world-space point lists: winding-rule hit testing,
//! area and centroid, arc-length walks, segment distance, bounds and
//! rounded-corner path construction. Every function is total; degenerate
//! input yields a documented fallback instead of an error.

use lyon::math::point as lyon_point;
use lyon::path::Path;
use siteplan_core::constants::EDGE_EPSILON;

use crate::model::Point;

/// Signed areas at or below this magnitude are treated as degenerate.
const AREA_EPSILON: f64 = 1e-9;

/// Cross product of `(b - a)` and `(p - a)`. Positive when the turn
/// `a -> b -> p` goes from +x towards +y, which is clockwise on the y-down
/// canvas.
fn is_left(a: Point, b: Point, p: Point) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (p.x - a.x) * (b.y - a.y)
}

/// Nonzero winding number of `points` around `p`.
pub fn winding_number(p: Point, points: &[Point]) -> i32 {
    let n = points.len();
    let mut winding = 0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        if a.y <= p.y {
            if b.y > p.y && is_left(a, b, p) > 0.0 {
                winding += 1;
            }
        } else if b.y <= p.y && is_left(a, b, p) < 0.0 {
            winding -= 1;
        }
    }
    winding
}

/// Nonzero fill-rule containment. Fewer than three points are never filled.
pub fn point_in_polygon(p: Point, points: &[Point]) -> bool {
    if points.len() < 3 {
        return false;
    }
    winding_number(p, points) != 0
}

/// Shoelace area, positive when the points run from +x towards +y
/// (clockwise as drawn on the y-down canvas).
pub fn signed_polygon_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        twice += a.x * b.y - b.x * a.y;
    }
    twice / 2.0
}

/// Unsigned polygon area.
pub fn polygon_area(points: &[Point]) -> f64 {
    signed_polygon_area(points).abs()
}

/// Area-weighted centroid.
///
/// Returns `None` for an empty list. Fewer than three points or a near-zero
/// signed area fall back to the bounding-box center.
pub fn polygon_centroid(points: &[Point]) -> Option<Point> {
    let bounds = Bounds::from_points(points)?;
    let area = signed_polygon_area(points);
    if points.len() < 3 || area.abs() <= AREA_EPSILON {
        return Some(bounds.center());
    }

    let n = points.len();
    let (mut cx, mut cy) = (0.0, 0.0);
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let cross = a.x * b.y - b.x * a.y;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }
    let factor = 1.0 / (6.0 * area);
    Some(Point::new(cx * factor, cy * factor))
}

/// Total length of an open polyline.
pub fn polyline_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

/// Point at arc length `distance` along an open polyline.
///
/// `distance` is clamped to `[0, length]`. Empty input yields `None`, a
/// single point yields that point.
pub fn point_at_distance(points: &[Point], distance: f64) -> Option<Point> {
    let first = *points.first()?;
    if points.len() == 1 {
        return Some(first);
    }

    let total = polyline_length(points);
    let target = if distance.is_nan() {
        0.0
    } else {
        distance.clamp(0.0, total)
    };

    let mut walked = 0.0;
    for w in points.windows(2) {
        let segment = w[0].distance_to(&w[1]);
        if segment <= EDGE_EPSILON {
            continue;
        }
        if walked + segment >= target {
            return Some(w[0].lerp(&w[1], (target - walked) / segment));
        }
        walked += segment;
    }
    points.last().copied()
}

/// Squared distance from `p` to the segment `a..b`.
pub fn distance_point_to_segment_squared(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= EDGE_EPSILON * EDGE_EPSILON {
        return p.distance_squared(&a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_squared(&Point::new(a.x + t * dx, a.y + t * dy))
}

/// Squared distance from `p` to the nearest segment of an open polyline.
/// Returns `f64::INFINITY` for an empty list.
pub fn distance_to_polyline_squared(p: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => p.distance_squared(only),
        _ => points
            .windows(2)
            .map(|w| distance_point_to_segment_squared(p, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Self::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    pub fn expanded(&self, margin: f64) -> Bounds {
        Bounds::new(
            self.min_x - margin,
            self.min_y - margin,
            self.max_x + margin,
            self.max_y + margin,
        )
    }
}

pub fn bounds_of(points: &[Point]) -> Option<Bounds> {
    Bounds::from_points(points)
}

/// Renderer-agnostic path instruction in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { ctrl: Point, to: Point },
    Close,
}

/// Closed path through the polygon's vertices. Fewer than three points give
/// an empty path.
pub fn sharp_polygon_path(points: &[Point]) -> Vec<PathCommand> {
    if points.len() < 3 {
        return Vec::new();
    }
    let mut commands = Vec::with_capacity(points.len() + 1);
    commands.push(PathCommand::MoveTo(points[0]));
    commands.extend(points[1..].iter().map(|p| PathCommand::LineTo(*p)));
    commands.push(PathCommand::Close);
    commands
}

/// Open path through the polyline's vertices. Fewer than two points give an
/// empty path.
pub fn polyline_path(points: &[Point]) -> Vec<PathCommand> {
    if points.len() < 2 {
        return Vec::new();
    }
    let mut commands = Vec::with_capacity(points.len());
    commands.push(PathCommand::MoveTo(points[0]));
    commands.extend(points[1..].iter().map(|p| PathCommand::LineTo(*p)));
    commands
}

/// Inset points on the incoming and outgoing edge of `vertex`.
fn corner_insets(prev: Point, vertex: Point, next: Point, inset: f64) -> (Point, Point) {
    let len_in = prev.distance_to(&vertex);
    let len_out = vertex.distance_to(&next);
    let d_in = inset.min(len_in / 2.0);
    let d_out = inset.min(len_out / 2.0);
    (
        vertex.lerp(&prev, d_in / len_in),
        vertex.lerp(&next, d_out / len_out),
    )
}

fn has_degenerate_edge<'a>(edges: impl Iterator<Item = (&'a Point, &'a Point)>) -> bool {
    edges.into_iter().any(|(a, b)| a.distance_to(b) <= EDGE_EPSILON)
}

/// Closed path with corners cut at an inset of
/// `min(smoothing * average_edge_length, edge_length / 2)` on each adjacent
/// edge and joined by a quadratic curve through the original vertex.
///
/// This approximates a fillet; it is not a constant-radius arc. Falls back to
/// [`sharp_polygon_path`] when `smoothing <= 0` or any edge has near-zero
/// length.
pub fn rounded_polygon_path(points: &[Point], smoothing: f64) -> Vec<PathCommand> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }
    let smoothing = if smoothing.is_nan() {
        0.0
    } else {
        smoothing.min(1.0)
    };
    let edges = (0..n).map(|i| (&points[i], &points[(i + 1) % n]));
    if smoothing <= 0.0 || has_degenerate_edge(edges) {
        return sharp_polygon_path(points);
    }

    let perimeter: f64 = (0..n)
        .map(|i| points[i].distance_to(&points[(i + 1) % n]))
        .sum();
    let inset = smoothing * perimeter / n as f64;

    let corners: Vec<(Point, Point)> = (0..n)
        .map(|i| corner_insets(points[(i + n - 1) % n], points[i], points[(i + 1) % n], inset))
        .collect();

    let mut commands = Vec::with_capacity(2 * n + 3);
    commands.push(PathCommand::MoveTo(corners[0].1));
    for i in 1..n {
        commands.push(PathCommand::LineTo(corners[i].0));
        commands.push(PathCommand::QuadTo {
            ctrl: points[i],
            to: corners[i].1,
        });
    }
    commands.push(PathCommand::LineTo(corners[0].0));
    commands.push(PathCommand::QuadTo {
        ctrl: points[0],
        to: corners[0].1,
    });
    commands.push(PathCommand::Close);
    commands
}

/// Open-line counterpart of [`rounded_polygon_path`]: interior vertices are
/// rounded, endpoints stay where they are.
pub fn rounded_polyline_path(points: &[Point], smoothing: f64) -> Vec<PathCommand> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }
    let smoothing = if smoothing.is_nan() {
        0.0
    } else {
        smoothing.min(1.0)
    };
    let edges = points.windows(2).map(|w| (&w[0], &w[1]));
    if n == 2 || smoothing <= 0.0 || has_degenerate_edge(edges) {
        return polyline_path(points);
    }

    let inset = smoothing * polyline_length(points) / (n - 1) as f64;
    let mut commands = Vec::with_capacity(2 * n);
    commands.push(PathCommand::MoveTo(points[0]));
    for i in 1..n - 1 {
        let (entry, exit) = corner_insets(points[i - 1], points[i], points[i + 1], inset);
        commands.push(PathCommand::LineTo(entry));
        commands.push(PathCommand::QuadTo {
            ctrl: points[i],
            to: exit,
        });
    }
    commands.push(PathCommand::LineTo(points[n - 1]));
    commands
}

/// Builds a `lyon` path from path commands. Drawing commands issued before a
/// `MoveTo` start a sub-path at their end point.
pub fn to_lyon_path(commands: &[PathCommand]) -> Path {
    let to_lyon = |p: Point| lyon_point(p.x as f32, p.y as f32);
    let mut builder = Path::builder();
    let mut open = false;

    for command in commands {
        match *command {
            PathCommand::MoveTo(p) => {
                if open {
                    builder.end(false);
                }
                builder.begin(to_lyon(p));
                open = true;
            }
            PathCommand::LineTo(p) => {
                if open {
                    builder.line_to(to_lyon(p));
                } else {
                    builder.begin(to_lyon(p));
                    open = true;
                }
            }
            PathCommand::QuadTo { ctrl, to } => {
                if open {
                    builder.quadratic_bezier_to(to_lyon(ctrl), to_lyon(to));
                } else {
                    builder.begin(to_lyon(to));
                    open = true;
                }
            }
            PathCommand::Close => {
                if open {
                    builder.end(true);
                    open = false;
                }
            }
        }
    }
    if open {
        builder.end(false);
    }
    builder.build()
}
