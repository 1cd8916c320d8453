//! Canvas owning the planning model: layers, polygons, polylines, the vertex
//! arena, planning images, the selection and the view transform.

mod operations;
mod types;

pub use operations::{resized_frame, uniform_resize};
pub use types::{DrawingMode, Endpoint, EndpointHit, HitTarget, ResizeHandle};

use std::collections::HashSet;

use siteplan_core::error::ModelError;
use siteplan_core::tuning::ViewSettings;

use crate::model::{
    FeatureRef, Layer, LayerKind, PlanPolygon, PlanPolyline, PlanningImage, Point,
    ScatterAssignment, VertexId, VertexStore,
};
use crate::selection_manager::SelectionManager;
use crate::viewport::ViewTransform;

/// Canvas state. At least one layer always exists and the active layer id
/// always names one of them.
#[derive(Debug, Clone)]
pub struct Canvas {
    layers: Vec<Layer>,
    active_layer_id: String,
    polygons: Vec<PlanPolygon>,
    polylines: Vec<PlanPolyline>,
    vertices: VertexStore,
    images: Vec<PlanningImage>,
    pub selection_manager: SelectionManager,
    viewport: ViewTransform,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Creates a canvas with a single terrain layer.
    pub fn new() -> Self {
        Self::with_view_settings(&ViewSettings::default())
    }

    pub fn with_view_settings(settings: &ViewSettings) -> Self {
        let layer = Layer::new(LayerKind::Terrain);
        Self {
            active_layer_id: layer.id.clone(),
            layers: vec![layer],
            polygons: Vec::new(),
            polylines: Vec::new(),
            vertices: VertexStore::new(),
            images: Vec::new(),
            selection_manager: SelectionManager::new(),
            viewport: ViewTransform::new(settings),
        }
    }

    /// Replaces the whole model. An empty layer list gets a default terrain
    /// layer; an unknown active layer falls back to the first layer.
    pub fn replace_model(
        &mut self,
        mut layers: Vec<Layer>,
        active_layer_id: &str,
        polygons: Vec<PlanPolygon>,
        polylines: Vec<PlanPolyline>,
        vertices: VertexStore,
        images: Vec<PlanningImage>,
    ) {
        if layers.is_empty() {
            layers.push(Layer::new(LayerKind::Terrain));
        }
        self.active_layer_id = if layers.iter().any(|l| l.id == active_layer_id) {
            active_layer_id.to_string()
        } else {
            layers[0].id.clone()
        };
        self.layers = layers;
        self.polygons = polygons;
        self.polylines = polylines;
        self.vertices = vertices;
        self.images = images;
        self.selection_manager.clear();
        self.collect_orphan_vertices();
    }

    pub fn viewport(&self) -> &ViewTransform {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewTransform {
        &mut self.viewport
    }

    /// True when there are no polygons, polylines or images.
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.polylines.is_empty() && self.images.is_empty()
    }

    pub fn feature_count(&self) -> usize {
        self.polygons.len() + self.polylines.len() + self.images.len()
    }

    // Layers

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_mut(&mut self, id: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn active_layer_id(&self) -> &str {
        &self.active_layer_id
    }

    pub fn active_layer(&self) -> &Layer {
        self.layer(&self.active_layer_id)
            .unwrap_or(&self.layers[0])
    }

    /// Makes `id` the active layer and drops a selection that no longer
    /// belongs to it. Returns whether the active layer changed.
    pub fn set_active_layer(&mut self, id: &str) -> Result<bool, ModelError> {
        if self.layer(id).is_none() {
            return Err(ModelError::LayerNotFound { id: id.to_string() });
        }
        if self.active_layer_id == id {
            return Ok(false);
        }
        self.active_layer_id = id.to_string();
        self.retain_selection_in_active_layer();
        Ok(true)
    }

    /// Adds a layer with default name, color and parameters and returns its id.
    pub fn add_layer(&mut self, kind: LayerKind) -> String {
        self.insert_layer(Layer::new(kind))
    }

    pub fn insert_layer(&mut self, layer: Layer) -> String {
        let id = layer.id.clone();
        self.layers.push(layer);
        id
    }

    /// Removes a layer with all its polygons and polylines.
    ///
    /// The last remaining layer cannot be removed.
    pub fn remove_layer(&mut self, id: &str) -> Result<Layer, ModelError> {
        let index = self
            .layers
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| ModelError::LayerNotFound { id: id.to_string() })?;
        if self.layers.len() == 1 {
            return Err(ModelError::LastLayer);
        }

        let layer = self.layers.remove(index);
        self.polygons.retain(|p| p.layer_id != layer.id);
        self.polylines.retain(|p| p.layer_id != layer.id);
        self.collect_orphan_vertices();

        if self.active_layer_id == layer.id {
            self.active_layer_id = self.layers[0].id.clone();
        }
        self.retain_selection_in_active_layer();
        Ok(layer)
    }

    // Features

    pub fn polygons(&self) -> &[PlanPolygon] {
        &self.polygons
    }

    pub fn polygon(&self, id: &str) -> Option<&PlanPolygon> {
        self.polygons.iter().find(|p| p.id == id)
    }

    pub fn polygon_mut(&mut self, id: &str) -> Option<&mut PlanPolygon> {
        self.polygons.iter_mut().find(|p| p.id == id)
    }

    pub fn polylines(&self) -> &[PlanPolyline] {
        &self.polylines
    }

    pub fn polyline(&self, id: &str) -> Option<&PlanPolyline> {
        self.polylines.iter().find(|p| p.id == id)
    }

    pub fn polyline_mut(&mut self, id: &str) -> Option<&mut PlanPolyline> {
        self.polylines.iter_mut().find(|p| p.id == id)
    }

    pub fn vertices(&self) -> &VertexStore {
        &self.vertices
    }

    pub fn vertices_mut(&mut self) -> &mut VertexStore {
        &mut self.vertices
    }

    /// Resolved positions of a polyline's vertices.
    pub fn polyline_points(&self, polyline: &PlanPolyline) -> Vec<Point> {
        polyline.points(&self.vertices)
    }

    pub fn images(&self) -> &[PlanningImage] {
        &self.images
    }

    pub fn image(&self, id: &str) -> Option<&PlanningImage> {
        self.images.iter().find(|i| i.id == id)
    }

    pub fn image_mut(&mut self, id: &str) -> Option<&mut PlanningImage> {
        self.images.iter_mut().find(|i| i.id == id)
    }

    pub fn add_polygon(&mut self, polygon: PlanPolygon) -> Result<String, ModelError> {
        if self.layer(&polygon.layer_id).is_none() {
            return Err(ModelError::LayerNotFound {
                id: polygon.layer_id,
            });
        }
        if polygon.points.len() < 3 {
            return Err(ModelError::Degenerate {
                reason: format!("polygon needs 3 points, got {}", polygon.points.len()),
            });
        }
        let id = polygon.id.clone();
        self.polygons.push(polygon);
        Ok(id)
    }

    /// Adds a polyline whose vertices are already in the arena.
    pub fn add_polyline(&mut self, polyline: PlanPolyline) -> Result<String, ModelError> {
        if self.layer(&polyline.layer_id).is_none() {
            return Err(ModelError::LayerNotFound {
                id: polyline.layer_id,
            });
        }
        let resolved = polyline
            .vertices
            .iter()
            .filter(|v| self.vertices.contains(v))
            .count();
        if resolved < 2 || resolved != polyline.vertices.len() {
            return Err(ModelError::Degenerate {
                reason: format!(
                    "polyline needs 2 known vertices, got {} of {}",
                    resolved,
                    polyline.vertices.len()
                ),
            });
        }
        let id = polyline.id.clone();
        self.polylines.push(polyline);
        Ok(id)
    }

    /// Adds an image on top of the stack.
    pub fn add_image(&mut self, image: PlanningImage) -> String {
        let id = image.id.clone();
        self.images.push(image);
        id
    }

    pub fn remove_polygon(&mut self, id: &str) -> Result<PlanPolygon, ModelError> {
        let index = self
            .polygons
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| ModelError::FeatureNotFound { id: id.to_string() })?;
        self.selection_manager
            .retain(|f| *f != FeatureRef::Polygon(id.to_string()));
        Ok(self.polygons.remove(index))
    }

    pub fn remove_polyline(&mut self, id: &str) -> Result<PlanPolyline, ModelError> {
        let index = self
            .polylines
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| ModelError::FeatureNotFound { id: id.to_string() })?;
        self.selection_manager
            .retain(|f| *f != FeatureRef::Polyline(id.to_string()));
        let polyline = self.polylines.remove(index);
        self.collect_orphan_vertices();
        Ok(polyline)
    }

    pub fn remove_image(&mut self, id: &str) -> Result<PlanningImage, ModelError> {
        let index = self
            .images
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| ModelError::ImageNotFound { id: id.to_string() })?;
        self.selection_manager
            .retain(|f| *f != FeatureRef::Image(id.to_string()));
        Ok(self.images.remove(index))
    }

    /// Deletes a feature unless its layer (or the image itself) is locked.
    pub fn delete_feature(&mut self, feature: &FeatureRef) -> Result<(), ModelError> {
        if self.is_feature_locked(feature) {
            return Err(ModelError::Locked {
                what: feature.id().to_string(),
            });
        }
        match feature {
            FeatureRef::Polygon(id) => self.remove_polygon(id).map(|_| ()),
            FeatureRef::Polyline(id) => self.remove_polyline(id).map(|_| ()),
            FeatureRef::Image(id) => self.remove_image(id).map(|_| ()),
        }
    }

    /// Owning layer of a polygon or polyline. Images have none.
    pub fn feature_layer(&self, feature: &FeatureRef) -> Option<&Layer> {
        let layer_id = match feature {
            FeatureRef::Polygon(id) => &self.polygon(id)?.layer_id,
            FeatureRef::Polyline(id) => &self.polyline(id)?.layer_id,
            FeatureRef::Image(_) => return None,
        };
        self.layer(layer_id)
    }

    pub fn feature_exists(&self, feature: &FeatureRef) -> bool {
        match feature {
            FeatureRef::Polygon(id) => self.polygon(id).is_some(),
            FeatureRef::Polyline(id) => self.polyline(id).is_some(),
            FeatureRef::Image(id) => self.image(id).is_some(),
        }
    }

    pub fn is_feature_locked(&self, feature: &FeatureRef) -> bool {
        match feature {
            FeatureRef::Image(id) => self.image(id).is_some_and(|i| i.locked),
            _ => self.feature_layer(feature).is_some_and(|l| l.locked),
        }
    }

    /// Whether a feature may be selected: it exists and, unless it is an
    /// image, sits on the active layer.
    pub fn is_selectable(&self, feature: &FeatureRef) -> bool {
        match feature {
            FeatureRef::Image(id) => self.image(id).is_some(),
            _ => self
                .feature_layer(feature)
                .is_some_and(|l| l.id == self.active_layer_id),
        }
    }

    /// Selects a feature. Features outside the active layer are ignored.
    pub fn select(&mut self, feature: FeatureRef) -> bool {
        if !self.is_selectable(&feature) {
            tracing::debug!("Ignoring selection of {} outside the active layer", feature.id());
            return false;
        }
        self.selection_manager.select(feature)
    }

    pub fn clear_selection(&mut self) -> bool {
        self.selection_manager.clear()
    }

    pub fn selected(&self) -> Option<&FeatureRef> {
        self.selection_manager.selected()
    }

    fn retain_selection_in_active_layer(&mut self) -> bool {
        let keep = match self.selection_manager.selected() {
            Some(feature) => self.is_selectable(feature),
            None => true,
        };
        self.selection_manager.retain(|_| keep)
    }

    /// Assigns or clears the scatter preset of a polygon or polyline.
    pub fn set_scatter(
        &mut self,
        feature: &FeatureRef,
        scatter: Option<ScatterAssignment>,
    ) -> Result<(), ModelError> {
        let scatter = scatter.map(ScatterAssignment::clamped);
        let slot = match feature {
            FeatureRef::Polygon(id) => self.polygon_mut(id).map(|p| &mut p.scatter),
            FeatureRef::Polyline(id) => self.polyline_mut(id).map(|p| &mut p.scatter),
            FeatureRef::Image(id) => return Err(ModelError::FeatureNotFound { id: id.clone() }),
        };
        let slot = slot.ok_or_else(|| ModelError::FeatureNotFound {
            id: feature.id().to_string(),
        })?;
        *slot = scatter;
        Ok(())
    }

    /// Removes vertices no polyline references. Returns the number removed.
    pub fn collect_orphan_vertices(&mut self) -> usize {
        let referenced: HashSet<&VertexId> =
            self.polylines.iter().flat_map(|p| p.vertices.iter()).collect();
        self.vertices.retain_referenced(&referenced)
    }

    // Image stacking; later images are drawn on top.

    /// Moves an image to `index` in the stack (clamped to the valid range).
    pub fn move_image_to(&mut self, id: &str, index: usize) -> Result<(), ModelError> {
        let from = self
            .images
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| ModelError::ImageNotFound { id: id.to_string() })?;
        let image = self.images.remove(from);
        let to = index.min(self.images.len());
        self.images.insert(to, image);
        Ok(())
    }

    /// Moves an image one step up the stack.
    pub fn raise_image(&mut self, id: &str) -> Result<(), ModelError> {
        let index = self.image_index(id)?;
        self.move_image_to(id, index + 1)
    }

    /// Moves an image one step down the stack.
    pub fn lower_image(&mut self, id: &str) -> Result<(), ModelError> {
        let index = self.image_index(id)?;
        self.move_image_to(id, index.saturating_sub(1))
    }

    fn image_index(&self, id: &str) -> Result<usize, ModelError> {
        self.images
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| ModelError::ImageNotFound { id: id.to_string() })
    }

    /// Removes every feature and image, keeping layers and view.
    pub fn clear_features(&mut self) {
        self.polygons.clear();
        self.polylines.clear();
        self.vertices.clear();
        self.images.clear();
        self.selection_manager.clear();
    }
}
