//! Engine-wide constants.
//!
//! Values that define the coordinate system and the valid ranges of layer,
//! scatter and image parameters. Tunable interaction values live in
//! [`crate::tuning`] instead.

/// Pixels per meter at view scale 1.0 (the 1:1 stage size).
pub const BASE_PIXELS_PER_METER: f64 = 4.0;

/// Edge length of the default ground plane in meters.
pub const DEFAULT_GROUND_SIZE_METERS: f64 = 400.0;

/// Padding in pixels kept around the content when fitting to the viewport.
pub const VIEW_PADDING: f64 = 24.0;

/// Multiplicative zoom step for zoom in/out commands.
pub const ZOOM_STEP: f64 = 1.2;

/// Zoom limits relative to the fit-to-content scale.
pub const MIN_ZOOM_FACTOR: f64 = 0.1;
pub const MAX_ZOOM_FACTOR: f64 = 4.0;

/// Snapshot format version written by this engine.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Rectangles narrower or shorter than this (world units) are not committed.
pub const MIN_RECTANGLE_SIZE: f64 = 3.0;

/// Numerical guard for zero-length edges.
pub const EDGE_EPSILON: f64 = 1e-8;

/// Road width range in meters.
pub const ROAD_WIDTH_RANGE: (f64, f64) = (0.1, 10.0);
/// Wall height range in meters.
pub const WALL_HEIGHT_RANGE: (f64, f64) = (0.1, 100.0);
/// Wall thickness range in meters.
pub const WALL_THICKNESS_RANGE: (f64, f64) = (0.01, 10.0);
/// Smoothing range shared by roads, water and floors.
pub const SMOOTHING_RANGE: (f64, f64) = (0.0, 1.0);

/// Scatter density range in percent.
pub const DENSITY_RANGE: (f64, f64) = (0.0, 100.0);
/// Scatter minimum spacing range in meters.
pub const SPACING_RANGE: (f64, f64) = (0.0, 10.0);
/// Smallest accepted scatter footprint area in square meters.
pub const MIN_FOOTPRINT_AREA: f64 = 0.01;

/// Image scale floor.
pub const MIN_IMAGE_SCALE: f64 = 0.05;
/// Smallest image frame edge during resize (world units).
pub const MIN_IMAGE_FRAME_SIZE: f64 = 1.0;

/// Clamps `value` to an inclusive `(min, max)` range, mapping NaN to `min`.
pub fn clamp_to(value: f64, (min, max): (f64, f64)) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}
