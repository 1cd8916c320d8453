//! Freehand, line and rectangle drafts.

use siteplan_core::constants::EDGE_EPSILON;
use siteplan_core::event_bus::FeatureKind;

use super::session::{DraftVertex, LineDraft};
use super::DesignerState;
use crate::canvas::Endpoint;
use crate::model::{PlanPolygon, PlanPolyline, Point, VertexId};

impl DesignerState {
    /// Appends a freehand vertex. A repeat of the last vertex is ignored.
    pub(crate) fn freehand_click(&mut self, world: Point) {
        let duplicate = self
            .freehand
            .last()
            .is_some_and(|last| last.distance_to(&world) <= EDGE_EPSILON);
        if duplicate {
            tracing::debug!("Duplicate freehand vertex ignored");
            return;
        }
        self.freehand.push(world);
    }

    /// Adds a line draft vertex, snapping to active-layer polyline endpoints.
    ///
    /// The first vertex of a draft placed on an endpoint continues that
    /// polyline; later endpoint hits share the existing vertex.
    pub(crate) fn line_click(&mut self, world: Point) {
        let radius = self.px_to_world(self.interaction.snap_radius_px);
        let endpoint = self.canvas.polyline_endpoint_near(world, radius);

        let vertex = match endpoint {
            Some(hit) => {
                let Some(point) = self.canvas.vertices().get(&hit.vertex) else {
                    return;
                };
                if self.line.is_empty() {
                    tracing::debug!(
                        "Continuing polyline {} from its {:?}",
                        hit.polyline_id,
                        hit.endpoint
                    );
                    self.line.continuation = Some((hit.polyline_id, hit.endpoint));
                }
                DraftVertex {
                    id: hit.vertex,
                    point,
                    shared: true,
                }
            }
            None => DraftVertex {
                id: VertexId::generate(),
                point: world,
                shared: false,
            },
        };

        let repeat = self.line.last().is_some_and(|last| {
            last.id == vertex.id || last.point.distance_to(&vertex.point) <= EDGE_EPSILON
        });
        if repeat {
            tracing::debug!("Duplicate line vertex ignored");
            return;
        }
        self.line.vertices.push(vertex);
    }

    /// Commits the freehand and line drafts. Returns whether a feature was
    /// committed or extended.
    pub fn commit_drafts(&mut self) -> bool {
        let freehand = self.commit_freehand().is_some();
        let line = self.commit_line().is_some();
        freehand || line
    }

    /// Commits the freehand draft as a polygon. Drafts with fewer than three
    /// vertices are discarded.
    pub fn commit_freehand(&mut self) -> Option<String> {
        let points = std::mem::take(&mut self.freehand);
        if points.is_empty() {
            return None;
        }
        if points.len() < 3 {
            tracing::debug!("Discarding freehand draft with {} vertices", points.len());
            return None;
        }
        let layer_id = self.canvas.active_layer_id().to_string();
        self.add_polygon(PlanPolygon::new(layer_id, points))
    }

    /// Commits the line draft. A continued polyline is extended in place;
    /// otherwise a new polyline is created. Fewer than two points discards.
    pub fn commit_line(&mut self) -> Option<String> {
        let draft = std::mem::take(&mut self.line);
        if draft.is_empty() {
            return None;
        }
        if draft.vertices.len() < 2 {
            tracing::debug!("Discarding line draft with a single vertex");
            return None;
        }

        for vertex in draft.vertices.iter().filter(|v| !v.shared) {
            self.canvas
                .vertices_mut()
                .insert_with_id(vertex.id.clone(), vertex.point);
        }

        if let Some(id) = self.extend_polyline(&draft) {
            self.is_modified = true;
            self.emit_updated(FeatureKind::Polyline, &id);
            tracing::info!("Extended polyline {}", id);
            return Some(id);
        }

        let layer_id = self.canvas.active_layer_id().to_string();
        let ids = draft.vertices.into_iter().map(|v| v.id).collect();
        match self.canvas.add_polyline(PlanPolyline::new(layer_id, ids)) {
            Ok(id) => {
                self.is_modified = true;
                self.emit_committed(FeatureKind::Polyline, &id);
                tracing::info!("Committed polyline {}", id);
                Some(id)
            }
            Err(e) => {
                tracing::warn!("Line draft rejected: {}", e);
                self.canvas.collect_orphan_vertices();
                None
            }
        }
    }

    fn extend_polyline(&mut self, draft: &LineDraft) -> Option<String> {
        let (polyline_id, endpoint) = draft.continuation.as_ref()?;
        let polyline = self.canvas.polyline_mut(polyline_id)?;
        let added = draft.vertices.iter().skip(1).map(|v| v.id.clone());
        match endpoint {
            Endpoint::End => polyline.vertices.extend(added),
            Endpoint::Start => {
                let mut vertices: Vec<VertexId> = added.rev().collect();
                vertices.append(&mut polyline.vertices);
                polyline.vertices = vertices;
            }
        }
        Some(polyline_id.clone())
    }

    /// Commits a dragged rectangle unless either side is below the minimum.
    pub(crate) fn commit_rectangle(&mut self, corner_a: Point, corner_b: Point) -> Option<String> {
        let min = self.interaction.min_rectangle_size;
        let width = (corner_b.x - corner_a.x).abs();
        let height = (corner_b.y - corner_a.y).abs();
        if width < min || height < min {
            tracing::debug!("Rectangle {:.2} x {:.2} below minimum size", width, height);
            return None;
        }
        let layer_id = self.canvas.active_layer_id().to_string();
        self.add_polygon(PlanPolygon::rectangle(layer_id, corner_a, corner_b))
    }

    fn add_polygon(&mut self, polygon: PlanPolygon) -> Option<String> {
        match self.canvas.add_polygon(polygon) {
            Ok(id) => {
                self.is_modified = true;
                self.emit_committed(FeatureKind::Polygon, &id);
                tracing::info!("Committed polygon {}", id);
                Some(id)
            }
            Err(e) => {
                tracing::warn!("Polygon rejected: {}", e);
                None
            }
        }
    }

    /// Discards drafts and the active session.
    pub fn cancel(&mut self) {
        if self.has_draft() || !self.session.is_idle() {
            tracing::debug!("Cancelling drafts and {} session", self.session.name());
        }
        self.cancel_session();
        self.freehand.clear();
        self.line = LineDraft::default();
    }
}
