//! # Siteplan
//!
//! Site-planning canvas engine for tracing terrain, building footprints,
//! roads, walls, floors and water over reference images, with reproducible
//! vegetation scatter on green regions.
//!
//! ## Architecture
//!
//! Siteplan is organized as a workspace with multiple crates:
//!
//! 1. **siteplan-core** - Errors, constants, tuning parameters, ids, events
//! 2. **siteplan-designer** - Geometry, view transform, scatter, drawing
//!    state machine and snapshot codec
//! 3. **siteplan-settings** - Configuration files, validation and overrides
//! 4. **siteplan** - Command-line tool that inspects and normalizes snapshots

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

pub use siteplan_core::{Error, EventBus, PlanEvent, Result};
pub use siteplan_designer::{
    Canvas, DesignerState, DrawingMode, LayerKind, PlanningSnapshot, PresetCatalog,
    StaticPresetCatalog,
};
pub use siteplan_settings::{Config, SettingsPersistence};

use siteplan_designer::geometry;
use siteplan_designer::scatter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting, or JSON lines when `json` is set
/// - RUST_LOG environment variable support
///
/// Logs go to stderr so command output on stdout stays parseable.
pub fn init_logging(json: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .json();
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_line_number(true)
            .pretty();
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}

/// Creates a designer state tuned by `config`.
pub fn designer_from_config(config: &Config) -> DesignerState {
    DesignerState::with_settings(config.interaction, config.view, config.scatter)
}

/// Loads the preset catalog named by `config`, or the built-in one.
pub fn load_preset_catalog(config: &Config) -> anyhow::Result<StaticPresetCatalog> {
    use anyhow::Context;

    match &config.preset_catalog {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read preset catalog {}", path.display()))?;
            let catalog = StaticPresetCatalog::from_json(&json)
                .with_context(|| format!("Invalid preset catalog {}", path.display()))?;
            tracing::debug!(
                "Loaded {} presets from {}",
                catalog.presets().len(),
                path.display()
            );
            Ok(catalog)
        }
        None => Ok(StaticPresetCatalog::default()),
    }
}

/// Loads a snapshot file into a designer state built from `config`.
pub fn open_plan(config: &Config, path: &Path) -> anyhow::Result<DesignerState> {
    let mut state = designer_from_config(config);
    let report = state.load_from_file(path)?;
    if report.dropped > 0 {
        tracing::warn!(
            "{}: dropped {} features with missing layers or vertices",
            path.display(),
            report.dropped
        );
    }
    Ok(state)
}

/// Per-layer totals of a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSummary {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub visible: bool,
    pub locked: bool,
    pub polygons: usize,
    pub polylines: usize,
    /// Total polygon area in square meters.
    pub area_m2: f64,
    /// Total polyline length in meters.
    pub length_m: f64,
}

/// Overview of a plan as printed by `siteplan inspect`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanSummary {
    pub active_layer: String,
    pub features: usize,
    pub images: usize,
    pub vertices: usize,
    pub layers: Vec<LayerSummary>,
}

/// Summarizes the canvas layer by layer, in layer order.
pub fn summarize(canvas: &Canvas) -> PlanSummary {
    let mut layers: Vec<LayerSummary> = canvas
        .layers()
        .iter()
        .map(|layer| LayerSummary {
            id: layer.id.clone(),
            name: layer.name.clone(),
            kind: layer.kind.to_string(),
            visible: layer.visible,
            locked: layer.locked,
            polygons: 0,
            polylines: 0,
            area_m2: 0.0,
            length_m: 0.0,
        })
        .collect();
    let index: BTreeMap<String, usize> = layers
        .iter()
        .enumerate()
        .map(|(i, layer)| (layer.id.clone(), i))
        .collect();

    for polygon in canvas.polygons() {
        if let Some(&i) = index.get(&polygon.layer_id) {
            layers[i].polygons += 1;
            layers[i].area_m2 += polygon.area();
        }
    }
    for polyline in canvas.polylines() {
        if let Some(&i) = index.get(&polyline.layer_id) {
            layers[i].polylines += 1;
            layers[i].length_m += geometry::polyline_length(&canvas.polyline_points(polyline));
        }
    }

    PlanSummary {
        active_layer: canvas.active_layer_id().to_string(),
        features: canvas.feature_count(),
        images: canvas.images().len(),
        vertices: canvas.vertices().len(),
        layers,
    }
}

/// Scatter preview of one green polygon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSummary {
    pub polygon_id: String,
    pub category: String,
    pub area_m2: f64,
    pub target: usize,
    pub points: usize,
}

/// Runs the scatter preview for every assigned polygon on a green layer.
pub fn scatter_report(state: &DesignerState, catalog: &dyn PresetCatalog) -> Vec<ScatterSummary> {
    let canvas = &state.canvas;
    canvas
        .polygons()
        .iter()
        .filter(|polygon| {
            canvas
                .layer(&polygon.layer_id)
                .is_some_and(|layer| layer.kind == LayerKind::Green)
        })
        .filter_map(|polygon| {
            let assignment = polygon.scatter.as_ref()?;
            let request = scatter::ScatterRequest::for_polygon(polygon, assignment, catalog);
            let target = scatter::plan(&request, state.scatter_limits())
                .map(|plan| plan.target)
                .unwrap_or(0);
            Some(ScatterSummary {
                polygon_id: polygon.id.clone(),
                category: assignment.category.clone(),
                area_m2: polygon.area(),
                target,
                points: state.scatter_preview(&polygon.id, catalog).len(),
            })
        })
        .collect()
}

/// Re-encodes a snapshot file: decodes it, drops unresolvable features and
/// writes the canonical form to `output`.
pub fn normalize_snapshot(config: &Config, input: &Path, output: &Path) -> anyhow::Result<usize> {
    let mut state = open_plan(config, input)?;
    state.save_to_file(output)?;
    tracing::info!("Normalized {} -> {}", input.display(), output.display());
    Ok(state.canvas.feature_count())
}
