//! Scatter density engine.
//!
//! Produces reproducible placement points inside a polygon that respect a
//! minimum pairwise distance. Used for vegetation/prop previews on green
//! layers.
//!
//! The point count target comes from the polygon area and the effective
//! footprint of one instance:
//! ```text
//! effective    = footprint * avg_scale^2
//! min_distance = max(spacing, sqrt(effective))
//! per_instance = max(effective, spacing^2)
//! target       = round(floor(area / per_instance) * density / 100)
//! ```
//! Candidates are drawn uniformly in the bounding box from a generator seeded
//! by the inputs and accepted when inside the polygon and clear of every
//! accepted point. A spatial hash with cell size `min_distance` keeps the
//! clearance check to a 3x3 neighbourhood.

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use siteplan_core::tuning::ScatterLimits;

use crate::geometry::{self, Bounds};
use crate::model::{LayerKind, PlanPolygon, Point, ScatterAssignment};

/// Catalog metadata for a vegetation/prop category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterPreset {
    pub category: String,
    pub label: String,
    #[serde(default)]
    pub icon: String,
    /// Suggested minimum spacing in meters for new assignments.
    pub spacing: f64,
    pub min_scale: f64,
    pub max_scale: f64,
}

impl ScatterPreset {
    pub fn average_scale(&self) -> f64 {
        let avg = (self.min_scale + self.max_scale) / 2.0;
        if avg.is_finite() && avg > 0.0 {
            avg
        } else {
            1.0
        }
    }

    /// A new assignment for `asset_id` using this preset's suggested spacing.
    pub fn assignment(&self, asset_id: impl Into<String>) -> ScatterAssignment {
        let mut assignment = ScatterAssignment::new(asset_id, self.category.clone());
        assignment.name = self.label.clone();
        assignment.thumbnail = self.icon.clone();
        assignment.set_min_spacing(self.spacing);
        assignment
    }
}

/// Read-only lookup of scatter presets by category.
pub trait PresetCatalog {
    fn preset(&self, category: &str) -> Option<ScatterPreset>;

    /// Average scale for a category; unknown categories scale by 1.0.
    fn average_scale(&self, category: &str) -> f64 {
        self.preset(category)
            .map(|p| p.average_scale())
            .unwrap_or(1.0)
    }
}

/// In-memory preset catalog.
#[derive(Debug, Clone)]
pub struct StaticPresetCatalog {
    presets: Vec<ScatterPreset>,
}

impl StaticPresetCatalog {
    pub fn new(presets: Vec<ScatterPreset>) -> Self {
        Self { presets }
    }

    /// Parses a JSON array of presets.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn presets(&self) -> &[ScatterPreset] {
        &self.presets
    }
}

impl Default for StaticPresetCatalog {
    fn default() -> Self {
        let preset = |category: &str, label: &str, spacing: f64, min_scale: f64, max_scale: f64| {
            ScatterPreset {
                category: category.to_string(),
                label: label.to_string(),
                icon: format!("{}.svg", category),
                spacing,
                min_scale,
                max_scale,
            }
        };
        Self::new(vec![
            preset("tree", "Trees", 4.0, 0.8, 1.4),
            preset("shrub", "Shrubs", 1.5, 0.6, 1.2),
            preset("grass", "Grass", 0.3, 0.5, 1.0),
            preset("flower", "Flowers", 0.4, 0.6, 1.0),
            preset("rock", "Rocks", 1.0, 0.5, 1.5),
        ])
    }
}

impl PresetCatalog for StaticPresetCatalog {
    fn preset(&self, category: &str) -> Option<ScatterPreset> {
        self.presets
            .iter()
            .find(|p| p.category.eq_ignore_ascii_case(category))
            .cloned()
    }
}

/// Inputs of one scatter computation.
#[derive(Debug, Clone, Copy)]
pub struct ScatterRequest<'a> {
    pub polygon_id: &'a str,
    pub points: &'a [Point],
    pub density_percent: f64,
    pub min_spacing_m: f64,
    pub footprint_area_m2: f64,
    pub average_scale: f64,
}

impl<'a> ScatterRequest<'a> {
    pub fn for_polygon(
        polygon: &'a PlanPolygon,
        assignment: &ScatterAssignment,
        catalog: &dyn PresetCatalog,
    ) -> Self {
        Self {
            polygon_id: &polygon.id,
            points: &polygon.points,
            density_percent: assignment.density_percent,
            min_spacing_m: assignment.min_spacing_meters,
            footprint_area_m2: assignment.footprint_area_m2,
            average_scale: catalog.average_scale(&assignment.category),
        }
    }
}

/// Target count and spacing derived from a request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPlan {
    pub target: usize,
    pub min_distance: f64,
    pub max_attempts: usize,
}

/// Computes the placement plan, or `None` when nothing should be placed.
pub fn plan(request: &ScatterRequest<'_>, limits: &ScatterLimits) -> Option<ScatterPlan> {
    let area = geometry::polygon_area(request.points);
    if !area.is_finite() || area < limits.min_polygon_area {
        return None;
    }

    let avg_scale = if request.average_scale.is_finite() && request.average_scale > 0.0 {
        request.average_scale
    } else {
        1.0
    };
    let spacing = finite_non_negative(request.min_spacing_m);
    let density = finite_non_negative(request.density_percent).min(100.0);
    let effective = finite_non_negative(request.footprint_area_m2) * avg_scale * avg_scale;

    let min_distance = spacing.max(effective.sqrt());
    let per_instance = effective.max(spacing * spacing);
    if per_instance <= 0.0 {
        return None;
    }

    let capacity = (area / per_instance).floor();
    let target = (capacity * density / 100.0).round();
    if !target.is_finite() || target <= 0.0 {
        return None;
    }

    let target = (target as usize).min(limits.max_points);
    let max_attempts = target
        .saturating_mul(limits.attempts_per_point)
        .min(limits.max_attempts);
    Some(ScatterPlan {
        target,
        min_distance,
        max_attempts,
    })
}

fn finite_non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Stable 64-bit FNV-1a hash of the request's identifying inputs.
pub fn scatter_seed(polygon_id: &str, density: f64, spacing: f64, footprint: f64) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET_BASIS;
    let mut feed = |bytes: &[u8]| {
        for byte in bytes {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(PRIME);
        }
    };
    feed(polygon_id.as_bytes());
    feed(&density.to_bits().to_le_bytes());
    feed(&spacing.to_bits().to_le_bytes());
    feed(&footprint.to_bits().to_le_bytes());
    hash
}

/// Uniform grid of accepted points keyed by cell coordinates.
struct SpatialHash {
    cell_size: f64,
    cells: HashMap<(i64, i64), SmallVec<[Point; 4]>>,
}

impl SpatialHash {
    fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    fn key(&self, p: Point) -> (i64, i64) {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
        )
    }

    /// True when no stored point is closer than `min_distance` to `p`.
    fn is_clear(&self, p: Point, min_distance: f64) -> bool {
        let (cx, cy) = self.key(p);
        let min_sq = min_distance * min_distance;
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(cell) = self.cells.get(&(cx + dx, cy + dy)) {
                    if cell.iter().any(|q| q.distance_squared(&p) < min_sq) {
                        return false;
                    }
                }
            }
        }
        true
    }

    fn insert(&mut self, p: Point) {
        let key = self.key(p);
        self.cells.entry(key).or_default().push(p);
    }
}

/// Upper bound on the up-front allocation; larger targets grow on demand.
const PREALLOCATE_LIMIT: usize = 4096;

/// Runs the density engine. Partial output (attempts exhausted) is valid.
pub fn scatter_points(request: &ScatterRequest<'_>, limits: &ScatterLimits) -> Vec<Point> {
    let Some(plan) = plan(request, limits) else {
        return Vec::new();
    };
    let Some(bounds) = Bounds::from_points(request.points) else {
        return Vec::new();
    };

    let seed = scatter_seed(
        request.polygon_id,
        request.density_percent,
        request.min_spacing_m,
        request.footprint_area_m2,
    );
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut grid = SpatialHash::new(plan.min_distance.max(f64::EPSILON));
    let mut accepted = Vec::with_capacity(plan.target.min(PREALLOCATE_LIMIT));

    let mut attempts = 0;
    while accepted.len() < plan.target && attempts < plan.max_attempts {
        attempts += 1;
        let u: f64 = rng.random();
        let v: f64 = rng.random();
        let candidate = Point::new(
            bounds.min_x + u * bounds.width(),
            bounds.min_y + v * bounds.height(),
        );
        if !geometry::point_in_polygon(candidate, request.points) {
            continue;
        }
        if !grid.is_clear(candidate, plan.min_distance) {
            continue;
        }
        grid.insert(candidate);
        accepted.push(candidate);
    }

    tracing::debug!(
        "Scatter {}: {}/{} points after {} attempts",
        request.polygon_id,
        accepted.len(),
        plan.target,
        attempts
    );
    accepted
}

/// Preview points for a polygon on a layer of `kind`. Only green layers with
/// an assignment produce points.
pub fn preview_for_polygon(
    polygon: &PlanPolygon,
    kind: LayerKind,
    catalog: &dyn PresetCatalog,
    limits: &ScatterLimits,
) -> Vec<Point> {
    match (&polygon.scatter, kind) {
        (Some(assignment), LayerKind::Green) => {
            scatter_points(&ScatterRequest::for_polygon(polygon, assignment, catalog), limits)
        }
        _ => Vec::new(),
    }
}
