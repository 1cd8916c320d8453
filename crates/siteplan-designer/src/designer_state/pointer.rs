//! Pointer handling: session start on press, coalesced moves, release.

use siteplan_core::constants::MIN_IMAGE_FRAME_SIZE;
use siteplan_core::event_bus::FeatureKind;

use super::session::{DragSession, VertexTarget};
use super::{DesignerState, PointerButton, PointerInput};
use crate::canvas::{DrawingMode, HitTarget};
use crate::model::{FeatureRef, Point};

impl DesignerState {
    /// Handles a pointer press. Returns whether a session started.
    ///
    /// While a session is active every other press is ignored.
    pub fn on_pointer_down(&mut self, input: PointerInput) -> bool {
        if !self.session.is_idle() {
            tracing::debug!(
                "Ignoring press of pointer {} during {} session",
                input.pointer_id,
                self.session.name()
            );
            return false;
        }
        let world = self.screen_to_world(input.position);

        let session = match input.button {
            PointerButton::Secondary | PointerButton::Middle => Some(self.pan_session(
                input,
                input.button == PointerButton::Secondary,
            )),
            PointerButton::Primary => match self.mode {
                DrawingMode::Pan => Some(self.pan_session(input, false)),
                DrawingMode::Select => self.press_select(input, world),
                DrawingMode::Rectangle => {
                    if self.active_layer_locked() {
                        tracing::debug!("Rectangle ignored on locked layer");
                        None
                    } else {
                        Some(DragSession::RectangleDraft {
                            pointer_id: input.pointer_id,
                            corner_a: world,
                            corner_b: world,
                        })
                    }
                }
                DrawingMode::FreehandPolygon | DrawingMode::Line => {
                    self.press_click_tool(input, world)
                }
                DrawingMode::AlignMarker => self.press_align_marker(input, world),
            },
        };

        match session {
            Some(session) => {
                tracing::debug!("Pointer {} started {} session", input.pointer_id, session.name());
                self.session = session;
                true
            }
            None => false,
        }
    }

    /// Records a pointer move. Nothing is applied until [`Self::flush_frame`].
    pub fn on_pointer_move(&mut self, input: PointerInput) {
        match self.session.pointer_id() {
            Some(id) if id == input.pointer_id => {
                self.pending.session_pointer = Some(input.position)
            }
            Some(_) => {}
            None => self.pending.hover = Some(input.position),
        }
    }

    /// Applies the latest pending pointer positions. Returns whether
    /// anything was applied.
    pub fn flush_frame(&mut self) -> bool {
        let frame = self.pending.take();
        if let Some(screen) = frame.session_pointer {
            self.apply_session_pointer(screen);
        }
        if let Some(screen) = frame.hover {
            self.hover = Some(self.screen_to_world(screen));
        }
        !frame.is_empty()
    }

    /// Handles a pointer release and finishes the session it started.
    pub fn on_pointer_up(&mut self, input: PointerInput) {
        if self.session.pointer_id() != Some(input.pointer_id) {
            return;
        }
        self.flush_frame();
        self.apply_session_pointer(input.position);

        let world = self.screen_to_world(input.position);
        let session = std::mem::take(&mut self.session);
        tracing::debug!("Pointer {} finished {} session", input.pointer_id, session.name());

        match session {
            DragSession::Idle => {}
            DragSession::PendingClick { moved, .. } => {
                if !moved {
                    self.click(world);
                }
            }
            DragSession::RectangleDraft {
                corner_a, corner_b, ..
            } => {
                self.commit_rectangle(corner_a, corner_b);
            }
            DragSession::Pan {
                moved,
                cancel_on_click,
                ..
            } => {
                if moved {
                    self.emit_view();
                } else if cancel_on_click {
                    self.cancel();
                }
            }
            DragSession::MovePolygon { polygon_id, .. } => {
                self.finish_edit(FeatureKind::Polygon, &polygon_id)
            }
            DragSession::MovePolyline { polyline_id, .. } => {
                self.finish_edit(FeatureKind::Polyline, &polyline_id)
            }
            DragSession::MoveImage { image_id, .. }
            | DragSession::ResizeImage { image_id, .. }
            | DragSession::MoveAlignMarker { image_id, .. } => {
                self.finish_edit(FeatureKind::Image, &image_id)
            }
            DragSession::DragVertex {
                target,
                moved,
                click_on_release,
                ..
            } => {
                if moved {
                    match target {
                        VertexTarget::Polygon { polygon_id, .. } => {
                            self.finish_edit(FeatureKind::Polygon, &polygon_id)
                        }
                        VertexTarget::Polyline { polyline_id, .. } => {
                            self.finish_edit(FeatureKind::Polyline, &polyline_id)
                        }
                    }
                } else if click_on_release {
                    self.line_click(world);
                }
            }
        }
    }

    /// Commits the active draft on a double click.
    pub fn on_double_click(&mut self) {
        self.flush_frame();
        self.commit_drafts();
    }

    /// Abandons the active session, restoring the geometry it captured.
    pub(crate) fn cancel_session(&mut self) {
        let session = std::mem::take(&mut self.session);
        self.pending.session_pointer = None;
        match session {
            DragSession::MovePolygon {
                polygon_id,
                start_points,
                ..
            } => {
                self.canvas
                    .translate_polygon_from(&polygon_id, &start_points, Point::default());
            }
            DragSession::MovePolyline { start_vertices, .. } => {
                self.canvas
                    .translate_vertices_from(&start_vertices, Point::default());
            }
            DragSession::MoveImage {
                image_id,
                start_position,
                ..
            } => {
                self.canvas
                    .move_image_from(&image_id, start_position, Point::default());
            }
            DragSession::ResizeImage {
                image_id,
                handle,
                start_frame,
                ..
            } => {
                self.canvas.resize_image_from(
                    &image_id,
                    start_frame,
                    handle,
                    Point::default(),
                    MIN_IMAGE_FRAME_SIZE,
                );
            }
            DragSession::DragVertex {
                target,
                start_point,
                ..
            } => self.place_vertex(&target, start_point),
            _ => {}
        }
    }

    fn pan_session(&self, input: PointerInput, cancel_on_click: bool) -> DragSession {
        DragSession::Pan {
            pointer_id: input.pointer_id,
            start_screen: input.position,
            start_offset: self.canvas.viewport().offset(),
            moved: false,
            cancel_on_click,
        }
    }

    fn press_select(&mut self, input: PointerInput, world: Point) -> Option<DragSession> {
        let pointer_id = input.pointer_id;
        let Some(hit) = self.canvas.hit_test(world, &self.interaction) else {
            self.clear_selection();
            return Some(self.pan_session(input, false));
        };

        match hit {
            HitTarget::PolygonVertex { polygon_id, index } => {
                if self.is_locked(&FeatureRef::Polygon(polygon_id.clone())) {
                    return None;
                }
                let start_point = *self.canvas.polygon(&polygon_id)?.points.get(index)?;
                Some(DragSession::DragVertex {
                    pointer_id,
                    target: VertexTarget::Polygon { polygon_id, index },
                    start_screen: input.position,
                    start_world: world,
                    start_point,
                    moved: false,
                    click_on_release: false,
                })
            }
            HitTarget::PolylineVertex {
                polyline_id,
                vertex,
            } => {
                if self.is_locked(&FeatureRef::Polyline(polyline_id.clone())) {
                    return None;
                }
                let start_point = self.canvas.vertices().get(&vertex)?;
                Some(DragSession::DragVertex {
                    pointer_id,
                    target: VertexTarget::Polyline {
                        polyline_id,
                        vertex,
                    },
                    start_screen: input.position,
                    start_world: world,
                    start_point,
                    moved: false,
                    click_on_release: false,
                })
            }
            HitTarget::ResizeHandle { image_id, handle } => {
                if self.is_locked(&FeatureRef::Image(image_id.clone())) {
                    return None;
                }
                let start_frame = self.canvas.image(&image_id)?.frame();
                Some(DragSession::ResizeImage {
                    pointer_id,
                    image_id,
                    handle,
                    start_world: world,
                    start_frame,
                })
            }
            HitTarget::Polyline(polyline_id) => {
                let feature = FeatureRef::Polyline(polyline_id.clone());
                self.select(feature.clone());
                let linear = self
                    .canvas
                    .feature_layer(&feature)
                    .is_some_and(|l| l.kind.is_linear());
                if linear {
                    tracing::debug!("Polyline {} is edited with the line tool", polyline_id);
                    return None;
                }
                if self.is_locked(&feature) {
                    return None;
                }
                let polyline = self.canvas.polyline(&polyline_id)?;
                let start_vertices = polyline
                    .unique_vertices()
                    .into_iter()
                    .filter_map(|id| {
                        let point = self.canvas.vertices().get(&id)?;
                        Some((id, point))
                    })
                    .collect();
                Some(DragSession::MovePolyline {
                    pointer_id,
                    polyline_id,
                    start_world: world,
                    start_vertices,
                })
            }
            HitTarget::Polygon(polygon_id) => {
                let feature = FeatureRef::Polygon(polygon_id.clone());
                self.select(feature.clone());
                if self.is_locked(&feature) {
                    return None;
                }
                let start_points = self.canvas.polygon(&polygon_id)?.points.clone();
                Some(DragSession::MovePolygon {
                    pointer_id,
                    polygon_id,
                    start_world: world,
                    start_points,
                })
            }
            HitTarget::Image(image_id) => {
                let feature = FeatureRef::Image(image_id.clone());
                self.select(feature.clone());
                if self.is_locked(&feature) {
                    return None;
                }
                let start_position = self.canvas.image(&image_id)?.position;
                Some(DragSession::MoveImage {
                    pointer_id,
                    image_id,
                    start_world: world,
                    start_position,
                })
            }
        }
    }

    fn press_click_tool(&mut self, input: PointerInput, world: Point) -> Option<DragSession> {
        if self.active_layer_locked() {
            tracing::debug!("{} ignored on locked layer", self.mode);
            return None;
        }
        if self.mode == DrawingMode::Line {
            let radius = self.px_to_world(self.interaction.snap_radius_px);
            if let Some((polyline_id, vertex)) = self.canvas.polyline_vertex_near(world, radius) {
                let start_point = self.canvas.vertices().get(&vertex)?;
                return Some(DragSession::DragVertex {
                    pointer_id: input.pointer_id,
                    target: VertexTarget::Polyline {
                        polyline_id,
                        vertex,
                    },
                    start_screen: input.position,
                    start_world: world,
                    start_point,
                    moved: false,
                    click_on_release: true,
                });
            }
        }
        Some(DragSession::PendingClick {
            pointer_id: input.pointer_id,
            start_screen: input.position,
            moved: false,
        })
    }

    fn press_align_marker(&mut self, input: PointerInput, world: Point) -> Option<DragSession> {
        let selected = match self.canvas.selected() {
            Some(FeatureRef::Image(id)) => self
                .canvas
                .image(id)
                .filter(|i| i.visible && !i.locked && i.contains(world))
                .map(|i| i.id.clone()),
            _ => None,
        };
        let image_id = selected.or_else(|| {
            self.canvas
                .images()
                .iter()
                .rev()
                .find(|i| i.visible && !i.locked && i.contains(world))
                .map(|i| i.id.clone())
        })?;

        if let Err(e) = self.canvas.set_align_marker(&image_id, world) {
            tracing::debug!("Align marker not set: {}", e);
            return None;
        }
        self.select(FeatureRef::Image(image_id.clone()));
        Some(DragSession::MoveAlignMarker {
            pointer_id: input.pointer_id,
            image_id,
        })
    }

    fn is_locked(&self, feature: &FeatureRef) -> bool {
        let locked = self.canvas.is_feature_locked(feature);
        if locked {
            tracing::debug!("{} is locked; selection only", feature.id());
        }
        locked
    }

    fn apply_session_pointer(&mut self, screen: Point) {
        let world = self.screen_to_world(screen);
        let slop = self.interaction.click_slop_px;
        let mut session = std::mem::take(&mut self.session);

        match &mut session {
            DragSession::Idle => {}
            DragSession::PendingClick {
                start_screen,
                moved,
                ..
            } => {
                if start_screen.distance_to(&screen) > slop {
                    *moved = true;
                }
            }
            DragSession::RectangleDraft { corner_b, .. } => *corner_b = world,
            DragSession::Pan {
                start_screen,
                start_offset,
                moved,
                ..
            } => {
                if start_screen.distance_to(&screen) > slop {
                    *moved = true;
                }
                if *moved {
                    let render_scale = self.canvas.viewport().render_scale();
                    let delta = screen - *start_screen;
                    self.canvas
                        .viewport_mut()
                        .set_offset(*start_offset + delta * (1.0 / render_scale));
                }
            }
            DragSession::MovePolygon {
                polygon_id,
                start_world,
                start_points,
                ..
            } => {
                self.canvas
                    .translate_polygon_from(polygon_id, start_points, world - *start_world);
            }
            DragSession::MovePolyline {
                start_world,
                start_vertices,
                ..
            } => {
                self.canvas
                    .translate_vertices_from(start_vertices, world - *start_world);
            }
            DragSession::MoveImage {
                image_id,
                start_world,
                start_position,
                ..
            } => {
                self.canvas
                    .move_image_from(image_id, *start_position, world - *start_world);
            }
            DragSession::ResizeImage {
                image_id,
                handle,
                start_world,
                start_frame,
                ..
            } => {
                self.canvas.resize_image_from(
                    image_id,
                    *start_frame,
                    *handle,
                    world - *start_world,
                    MIN_IMAGE_FRAME_SIZE,
                );
            }
            DragSession::DragVertex {
                target,
                start_screen,
                start_world,
                start_point,
                moved,
                ..
            } => {
                if start_screen.distance_to(&screen) > slop {
                    *moved = true;
                }
                if *moved {
                    self.place_vertex(target, *start_point + (world - *start_world));
                }
            }
            DragSession::MoveAlignMarker { image_id, .. } => {
                if let Err(e) = self.canvas.set_align_marker(image_id, world) {
                    tracing::debug!("Align marker drag stopped: {}", e);
                }
            }
        }

        self.session = session;
    }

    fn place_vertex(&mut self, target: &VertexTarget, point: Point) {
        match target {
            VertexTarget::Polygon { polygon_id, index } => {
                self.canvas.set_polygon_point(polygon_id, *index, point);
            }
            VertexTarget::Polyline { vertex, .. } => {
                self.canvas.move_vertex(vertex, point);
            }
        }
    }

    fn finish_edit(&mut self, kind: FeatureKind, id: &str) {
        self.is_modified = true;
        self.emit_updated(kind, id);
    }

    fn click(&mut self, world: Point) {
        match self.mode {
            DrawingMode::FreehandPolygon => self.freehand_click(world),
            DrawingMode::Line => self.line_click(world),
            _ => {}
        }
    }
}
