//! Hit-testing and geometry operations for Canvas.

use siteplan_core::constants::MIN_IMAGE_SCALE;
use siteplan_core::error::ModelError;
use siteplan_core::tuning::InteractionSettings;

use super::types::{Endpoint, EndpointHit, HitTarget, ResizeHandle};
use super::Canvas;
use crate::geometry;
use crate::model::{FeatureRef, ImageFrame, Layer, Point, VertexId};

impl Canvas {
    fn visible_in_active_layer(&self, layer_id: &str) -> Option<&Layer> {
        self.layer(layer_id)
            .filter(|l| l.id == self.active_layer_id() && l.visible)
    }

    /// Hit-tests the canvas at a world position, honouring the priority
    /// vertex handles of the selection, resize handles of the selected image,
    /// polylines, polygons, images. Only the active layer is considered.
    pub fn hit_test(&self, world: Point, settings: &InteractionSettings) -> Option<HitTarget> {
        let view = self.viewport();
        let handle_radius = view.screen_to_world_distance(settings.handle_radius_px);
        let stroke_half = view.screen_to_world_distance(settings.polyline_stroke_px / 2.0);

        if let Some(hit) = self.vertex_handle_at(world, handle_radius) {
            return Some(hit);
        }
        if let Some(hit) = self.resize_handle_at(world, handle_radius) {
            return Some(hit);
        }
        if let Some(id) = self.polyline_at(world, stroke_half) {
            return Some(HitTarget::Polyline(id));
        }
        if let Some(id) = self.polygon_at(world) {
            return Some(HitTarget::Polygon(id));
        }
        self.image_at(world).map(HitTarget::Image)
    }

    /// Vertex handle of the selected polygon or polyline under `world`.
    /// Road and wall polylines expose no handles here; they are edited with
    /// the line tool.
    pub fn vertex_handle_at(&self, world: Point, radius: f64) -> Option<HitTarget> {
        let radius_sq = radius * radius;
        match self.selected()? {
            FeatureRef::Polygon(id) => {
                let polygon = self.polygon(id)?;
                self.visible_in_active_layer(&polygon.layer_id)?;
                polygon
                    .points
                    .iter()
                    .position(|p| p.distance_squared(&world) <= radius_sq)
                    .map(|index| HitTarget::PolygonVertex {
                        polygon_id: id.clone(),
                        index,
                    })
            }
            FeatureRef::Polyline(id) => {
                let polyline = self.polyline(id)?;
                let layer = self.visible_in_active_layer(&polyline.layer_id)?;
                if layer.kind.is_linear() {
                    return None;
                }
                polyline
                    .vertices
                    .iter()
                    .find(|v| {
                        self.vertices()
                            .get(v)
                            .is_some_and(|p| p.distance_squared(&world) <= radius_sq)
                    })
                    .map(|vertex| HitTarget::PolylineVertex {
                        polyline_id: id.clone(),
                        vertex: vertex.clone(),
                    })
            }
            FeatureRef::Image(_) => None,
        }
    }

    /// Resize handle of the selected, visible image under `world`.
    pub fn resize_handle_at(&self, world: Point, radius: f64) -> Option<HitTarget> {
        let FeatureRef::Image(id) = self.selected()? else {
            return None;
        };
        let image = self.image(id).filter(|i| i.visible)?;
        let frame = image.frame();
        let radius_sq = radius * radius;
        ResizeHandle::ALL
            .iter()
            .find(|h| h.position(&frame).distance_squared(&world) <= radius_sq)
            .map(|handle| HitTarget::ResizeHandle {
                image_id: id.clone(),
                handle: *handle,
            })
    }

    /// Topmost active-layer polyline whose stroke covers `world`. Road
    /// strokes are at least as wide as the road.
    pub fn polyline_at(&self, world: Point, stroke_half_width: f64) -> Option<String> {
        self.polylines().iter().rev().find_map(|polyline| {
            let layer = self.visible_in_active_layer(&polyline.layer_id)?;
            let half = layer
                .road_width()
                .map(|w| (w / 2.0).max(stroke_half_width))
                .unwrap_or(stroke_half_width);
            let points = self.polyline_points(polyline);
            (geometry::distance_to_polyline_squared(world, &points) <= half * half)
                .then(|| polyline.id.clone())
        })
    }

    /// Topmost active-layer polygon containing `world`.
    pub fn polygon_at(&self, world: Point) -> Option<String> {
        self.polygons()
            .iter()
            .rev()
            .filter(|p| self.visible_in_active_layer(&p.layer_id).is_some())
            .find(|p| p.contains(world))
            .map(|p| p.id.clone())
    }

    /// Topmost visible image containing `world`.
    pub fn image_at(&self, world: Point) -> Option<String> {
        self.images()
            .iter()
            .rev()
            .find(|i| i.visible && i.contains(world))
            .map(|i| i.id.clone())
    }

    /// Nearest endpoint of an active-layer polyline within `radius`.
    pub fn polyline_endpoint_near(&self, world: Point, radius: f64) -> Option<EndpointHit> {
        let radius_sq = radius * radius;
        let mut best: Option<(f64, EndpointHit)> = None;
        for polyline in self.polylines() {
            if self.visible_in_active_layer(&polyline.layer_id).is_none() {
                continue;
            }
            let ends = [
                (Endpoint::Start, polyline.first()),
                (Endpoint::End, polyline.last()),
            ];
            for (endpoint, vertex) in ends {
                let Some(vertex) = vertex else { continue };
                let Some(p) = self.vertices().get(vertex) else {
                    continue;
                };
                let d = p.distance_squared(&world);
                if d <= radius_sq && best.as_ref().is_none_or(|(bd, _)| d < *bd) {
                    best = Some((
                        d,
                        EndpointHit {
                            polyline_id: polyline.id.clone(),
                            endpoint,
                            vertex: vertex.clone(),
                        },
                    ));
                }
            }
        }
        best.map(|(_, hit)| hit)
    }

    /// Nearest vertex of any active-layer polyline within `radius`.
    pub fn polyline_vertex_near(&self, world: Point, radius: f64) -> Option<(String, VertexId)> {
        let radius_sq = radius * radius;
        let mut best: Option<(f64, String, VertexId)> = None;
        for polyline in self.polylines() {
            if self.visible_in_active_layer(&polyline.layer_id).is_none() {
                continue;
            }
            for vertex in &polyline.vertices {
                let Some(p) = self.vertices().get(vertex) else {
                    continue;
                };
                let d = p.distance_squared(&world);
                if d <= radius_sq && best.as_ref().is_none_or(|(bd, _, _)| d < *bd) {
                    best = Some((d, polyline.id.clone(), vertex.clone()));
                }
            }
        }
        best.map(|(_, id, vertex)| (id, vertex))
    }

    /// Replaces a polygon's points with `start` translated by `delta`.
    pub fn translate_polygon_from(&mut self, id: &str, start: &[Point], delta: Point) -> bool {
        match self.polygon_mut(id) {
            Some(polygon) => {
                polygon.points = start.iter().map(|p| *p + delta).collect();
                true
            }
            None => false,
        }
    }

    /// Moves a single polygon point.
    pub fn set_polygon_point(&mut self, id: &str, index: usize, point: Point) -> bool {
        match self.polygon_mut(id).and_then(|p| p.points.get_mut(index)) {
            Some(slot) => {
                *slot = point;
                true
            }
            None => false,
        }
    }

    /// Places every captured vertex at its start position plus `delta`.
    pub fn translate_vertices_from(&mut self, start: &[(VertexId, Point)], delta: Point) {
        for (id, p) in start {
            self.vertices_mut().set(id, *p + delta);
        }
    }

    pub fn move_vertex(&mut self, id: &VertexId, point: Point) -> bool {
        self.vertices_mut().set(id, point)
    }

    pub fn move_image_from(&mut self, id: &str, start: Point, delta: Point) -> bool {
        match self.image_mut(id) {
            Some(image) => {
                image.position = start + delta;
                true
            }
            None => false,
        }
    }

    /// Applies a handle drag to an image, keeping its aspect ratio.
    pub fn resize_image_from(
        &mut self,
        id: &str,
        start: ImageFrame,
        handle: ResizeHandle,
        delta: Point,
        min_size: f64,
    ) -> bool {
        match self.image_mut(id) {
            Some(image) => {
                let (position, scale) =
                    uniform_resize(image.width, image.height, start, handle, delta, min_size);
                image.position = position;
                image.scale = scale;
                true
            }
            None => false,
        }
    }

    /// Sets an image's registration marker from a world position.
    pub fn set_align_marker(&mut self, id: &str, world: Point) -> Result<Point, ModelError> {
        let image = self
            .image_mut(id)
            .ok_or_else(|| ModelError::ImageNotFound { id: id.to_string() })?;
        if image.locked {
            return Err(ModelError::Locked {
                what: format!("image {}", id),
            });
        }
        let local = image.world_to_local(world);
        image.align_marker = Some(local);
        Ok(local)
    }

    /// Translates every other marked, unlocked image so its marker lands on
    /// the reference image's marker. Returns the number of images moved.
    pub fn align_images_to(&mut self, reference_id: &str) -> Result<usize, ModelError> {
        let reference = self
            .image(reference_id)
            .ok_or_else(|| ModelError::ImageNotFound {
                id: reference_id.to_string(),
            })?;
        let target = reference.marker_world().ok_or_else(|| ModelError::Degenerate {
            reason: format!("image {} has no align marker", reference_id),
        })?;

        let mut moved = 0;
        for image in self.images.iter_mut() {
            if image.id == reference_id || image.locked {
                continue;
            }
            if let Some(marker) = image.align_marker {
                image.position = target - marker * image.scale;
                moved += 1;
            }
        }
        tracing::debug!("Aligned {} images to {}", moved, reference_id);
        Ok(moved)
    }
}

/// Frame after dragging `handle` by `delta`, before aspect correction.
/// Width and height never drop below `min_size`; the opposite edge stays put.
pub fn resized_frame(
    start: ImageFrame,
    handle: ResizeHandle,
    delta: Point,
    min_size: f64,
) -> ImageFrame {
    let mut frame = start;
    if handle.moves_right() {
        frame.w = (start.w + delta.x).max(min_size);
    } else if handle.moves_left() {
        frame.w = (start.w - delta.x).max(min_size);
        frame.x = start.right() - frame.w;
    }
    if handle.moves_bottom() {
        frame.h = (start.h + delta.y).max(min_size);
    } else if handle.moves_top() {
        frame.h = (start.h - delta.y).max(min_size);
        frame.y = start.bottom() - frame.h;
    }
    frame
}

/// Re-expresses a handle drag as a uniform scale plus origin.
///
/// `scale = max(w / width, h / height, MIN_IMAGE_SCALE)`; the edges opposite
/// the dragged handle stay anchored.
pub fn uniform_resize(
    width: f64,
    height: f64,
    start: ImageFrame,
    handle: ResizeHandle,
    delta: Point,
    min_size: f64,
) -> (Point, f64) {
    let frame = resized_frame(start, handle, delta, min_size);
    let scale = (frame.w / width).max(frame.h / height).max(MIN_IMAGE_SCALE);
    let new_w = width * scale;
    let new_h = height * scale;

    let x = if handle.moves_left() {
        start.right() - new_w
    } else {
        start.x
    };
    let y = if handle.moves_top() {
        start.bottom() - new_h
    } else {
        start.y
    };
    (Point::new(x, y), scale)
}
