//! Planning snapshot codec.
//!
//! Converts the canvas model to and from the persisted planning snapshot
//! (camelCase JSON, `version: 1`). Decoding is lenient: missing or invalid
//! layer parameters fall back to per-kind defaults and are clamped, features
//! that cannot be committed are dropped with a warning, and polyline points
//! that share an id become a shared vertex.
//!
//! Polyline points that arrive without an `id` get a fresh vertex id, and
//! encoding always writes vertex ids. A snapshot without ids therefore
//! comes back with ids after one pass; from then on the round trip is
//! identical.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::path::Path;

use siteplan_core::constants::SNAPSHOT_VERSION;
use siteplan_core::error::SnapshotError;

use crate::canvas::Canvas;
use crate::model::{
    Layer, LayerKind, LayerParams, PlanPolygon, PlanPolyline, PlanningImage, Point,
    ScatterAssignment, VertexId, VertexStore,
};

fn current_version() -> u32 {
    SNAPSHOT_VERSION
}

fn default_true() -> bool {
    true
}

fn default_scale() -> f64 {
    1.0
}

/// Accepts numbers and numeric strings; anything else reads as missing.
fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| {
            v.as_f64()
                .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
        })
        .filter(|v: &f64| v.is_finite()))
}

/// Persisted planning snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningSnapshot {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub active_layer_id: String,
    #[serde(default)]
    pub layers: Vec<LayerRecord>,
    #[serde(default)]
    pub view_transform: ViewTransformRecord,
    #[serde(default)]
    pub polygons: Vec<PolygonRecord>,
    #[serde(default)]
    pub polylines: Vec<PolylineRecord>,
    #[serde(default)]
    pub images: Vec<ImageRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub color: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub road_width_meters: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub road_smoothing: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub water_smoothing: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub floor_smooth: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub wall_height_meters: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub wall_thickness_meters: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewTransformRecord {
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub offset: Point,
}

impl Default for ViewTransformRecord {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Point::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub layer_id: String,
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scatter: Option<ScatterAssignment>,
}

/// Polyline point; `id` identifies a vertex shared between lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolylineRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub layer_id: String,
    #[serde(default)]
    pub points: Vec<VertexRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scatter: Option<ScatterAssignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub size_label: String,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "default_scale")]
    pub opacity: f64,
    #[serde(default)]
    pub position: Point,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align_marker: Option<Point>,
}

/// What decoding had to drop or coerce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeReport {
    pub features: usize,
    pub dropped: usize,
}

impl LayerRecord {
    fn from_layer(layer: &Layer) -> Self {
        let mut record = Self {
            id: layer.id.clone(),
            name: layer.name.clone(),
            kind: layer.kind.to_string(),
            color: layer.color.clone(),
            visible: layer.visible,
            locked: layer.locked,
            road_width_meters: None,
            road_smoothing: None,
            water_smoothing: None,
            floor_smooth: None,
            wall_height_meters: None,
            wall_thickness_meters: None,
        };
        match layer.params() {
            LayerParams::Road { width_m, smoothing } => {
                record.road_width_meters = Some(width_m);
                record.road_smoothing = Some(smoothing);
            }
            LayerParams::Water { smoothing } => record.water_smoothing = Some(smoothing),
            LayerParams::Floor { smoothing } => record.floor_smooth = Some(smoothing),
            LayerParams::Wall {
                height_m,
                thickness_m,
            } => {
                record.wall_height_meters = Some(height_m);
                record.wall_thickness_meters = Some(thickness_m);
            }
            LayerParams::None => {}
        }
        record
    }

    fn to_layer(&self) -> Layer {
        let kind = LayerKind::parse(&self.kind).unwrap_or_else(|| {
            tracing::warn!(
                "Layer {} has unknown kind {:?}, using terrain",
                self.id,
                self.kind
            );
            LayerKind::Terrain
        });
        let mut layer = if self.id.is_empty() {
            Layer::new(kind)
        } else {
            Layer::with_id(self.id.clone(), kind)
        };
        if !self.name.is_empty() {
            layer.name = self.name.clone();
        }
        if !self.color.is_empty() {
            layer.color = self.color.clone();
        }
        layer.visible = self.visible;
        layer.locked = self.locked;

        let params = match LayerParams::defaults_for(kind) {
            LayerParams::Road { width_m, smoothing } => LayerParams::Road {
                width_m: self.road_width_meters.unwrap_or(width_m),
                smoothing: self.road_smoothing.unwrap_or(smoothing),
            },
            LayerParams::Water { smoothing } => LayerParams::Water {
                smoothing: self.water_smoothing.unwrap_or(smoothing),
            },
            LayerParams::Floor { smoothing } => LayerParams::Floor {
                smoothing: self.floor_smooth.unwrap_or(smoothing),
            },
            LayerParams::Wall {
                height_m,
                thickness_m,
            } => LayerParams::Wall {
                height_m: self.wall_height_meters.unwrap_or(height_m),
                thickness_m: self.wall_thickness_meters.unwrap_or(thickness_m),
            },
            LayerParams::None => LayerParams::None,
        };
        layer.set_params(params);
        layer
    }
}

impl ImageRecord {
    fn from_image(image: &PlanningImage) -> Self {
        Self {
            id: image.id.clone(),
            name: image.name.clone(),
            url: image.url.clone(),
            size_label: image.size_label.clone(),
            width: image.width,
            height: image.height,
            visible: image.visible,
            locked: image.locked,
            opacity: image.opacity,
            position: image.position,
            scale: image.scale,
            align_marker: image.align_marker,
        }
    }

    fn to_image(&self) -> PlanningImage {
        let mut image = PlanningImage::new(self.url.clone(), self.width, self.height);
        if !self.id.is_empty() {
            image.id = self.id.clone();
        }
        if !self.name.is_empty() {
            image.name = self.name.clone();
        }
        if !self.size_label.is_empty() {
            image.size_label = self.size_label.clone();
        }
        image.visible = self.visible;
        image.locked = self.locked;
        image.set_opacity(self.opacity);
        image.set_scale(self.scale);
        if self.position.is_finite() {
            image.position = self.position;
        }
        image.align_marker = self.align_marker.filter(Point::is_finite);
        image
    }
}

impl PlanningSnapshot {
    /// Encodes the canvas model. Polyline points always carry their vertex id.
    pub fn from_canvas(canvas: &Canvas) -> Self {
        let view = canvas.viewport();
        Self {
            version: SNAPSHOT_VERSION,
            active_layer_id: canvas.active_layer_id().to_string(),
            layers: canvas.layers().iter().map(LayerRecord::from_layer).collect(),
            view_transform: ViewTransformRecord {
                scale: view.scale(),
                offset: view.offset(),
            },
            polygons: canvas
                .polygons()
                .iter()
                .map(|p| PolygonRecord {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    layer_id: p.layer_id.clone(),
                    points: p.points.clone(),
                    scatter: p.scatter.clone(),
                })
                .collect(),
            polylines: canvas
                .polylines()
                .iter()
                .map(|p| PolylineRecord {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    layer_id: p.layer_id.clone(),
                    points: p
                        .vertices
                        .iter()
                        .filter_map(|id| {
                            canvas.vertices().get(id).map(|pt| VertexRecord {
                                id: Some(id.to_string()),
                                x: pt.x,
                                y: pt.y,
                            })
                        })
                        .collect(),
                    scatter: p.scatter.clone(),
                })
                .collect(),
            images: canvas.images().iter().map(ImageRecord::from_image).collect(),
        }
    }

    /// A snapshot without polygons, polylines and images is empty.
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.polylines.is_empty() && self.images.is_empty()
    }

    pub fn feature_count(&self) -> usize {
        self.polygons.len() + self.polylines.len() + self.images.len()
    }

    pub fn check_version(&self) -> std::result::Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                version: self.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(())
    }

    pub fn to_json(&self) -> std::result::Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    /// Replaces the canvas model with this snapshot, applying the decode
    /// coercions. The canvas is untouched when the version is unsupported.
    pub fn apply_to(&self, canvas: &mut Canvas) -> std::result::Result<DecodeReport, SnapshotError> {
        self.check_version()?;
        let mut report = DecodeReport::default();

        let mut layers: Vec<Layer> = Vec::with_capacity(self.layers.len());
        for record in &self.layers {
            let layer = record.to_layer();
            if layers.iter().any(|l| l.id == layer.id) {
                tracing::warn!("Dropping duplicate layer {}", layer.id);
                continue;
            }
            layers.push(layer);
        }
        if layers.is_empty() {
            tracing::warn!("Snapshot has no layers, adding a terrain layer");
            layers.push(Layer::new(LayerKind::Terrain));
        }
        let layer_ids: HashSet<&str> = layers.iter().map(|l| l.id.as_str()).collect();

        let mut polygons = Vec::with_capacity(self.polygons.len());
        for record in &self.polygons {
            let valid_points = record.points.iter().all(Point::is_finite);
            if record.points.len() < 3 || !valid_points || !layer_ids.contains(record.layer_id.as_str()) {
                tracing::warn!(
                    "Dropping polygon {} ({} points, layer {:?})",
                    record.id,
                    record.points.len(),
                    record.layer_id
                );
                report.dropped += 1;
                continue;
            }
            let mut polygon = PlanPolygon::new(record.layer_id.clone(), record.points.clone());
            if !record.id.is_empty() {
                polygon.id = record.id.clone();
            }
            if !record.name.is_empty() {
                polygon.name = record.name.clone();
            }
            polygon.scatter = record.scatter.clone().map(ScatterAssignment::clamped);
            polygons.push(polygon);
        }

        let mut vertices = VertexStore::new();
        let mut polylines = Vec::with_capacity(self.polylines.len());
        for record in &self.polylines {
            let finite: Vec<&VertexRecord> = record
                .points
                .iter()
                .filter(|p| p.x.is_finite() && p.y.is_finite())
                .collect();
            if finite.len() < 2 || !layer_ids.contains(record.layer_id.as_str()) {
                tracing::warn!(
                    "Dropping polyline {} ({} points, layer {:?})",
                    record.id,
                    finite.len(),
                    record.layer_id
                );
                report.dropped += 1;
                continue;
            }

            let ids: Vec<VertexId> = finite
                .iter()
                .map(|p| {
                    let point = Point::new(p.x, p.y);
                    match p.id.as_deref().filter(|id| !id.is_empty()) {
                        Some(id) => {
                            let id = VertexId::from(id);
                            if !vertices.contains(&id) {
                                vertices.insert_with_id(id.clone(), point);
                            }
                            id
                        }
                        None => vertices.insert(point),
                    }
                })
                .collect();

            let mut polyline = PlanPolyline::new(record.layer_id.clone(), ids);
            if !record.id.is_empty() {
                polyline.id = record.id.clone();
            }
            if !record.name.is_empty() {
                polyline.name = record.name.clone();
            }
            polyline.scatter = record.scatter.clone().map(ScatterAssignment::clamped);
            polylines.push(polyline);
        }

        let images: Vec<PlanningImage> = self.images.iter().map(ImageRecord::to_image).collect();

        report.features = polygons.len() + polylines.len() + images.len();
        canvas.replace_model(
            layers,
            &self.active_layer_id,
            polygons,
            polylines,
            vertices,
            images,
        );
        canvas.viewport_mut().restore(
            self.view_transform.scale,
            self.view_transform.offset,
        );
        tracing::info!(
            "Loaded snapshot: {} features, {} dropped",
            report.features,
            report.dropped
        );
        Ok(report)
    }

    /// Decodes into a fresh canvas.
    pub fn to_canvas(&self) -> std::result::Result<(Canvas, DecodeReport), SnapshotError> {
        let mut canvas = Canvas::new();
        let report = self.apply_to(&mut canvas)?;
        Ok((canvas, report))
    }

    /// Writes the snapshot as pretty JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json().context("Failed to encode planning snapshot")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;
        Ok(())
    }

    /// Reads and version-checks a snapshot file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot from {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid snapshot {}", path.display()))
    }
}
