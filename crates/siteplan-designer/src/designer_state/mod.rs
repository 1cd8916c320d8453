//! Drawing and editing state machine.
//! Interprets pointer and keyboard input, owns the canvas and publishes
//! planning events.
//!
//! This module is split into submodules:
//! - `session`: drag sessions, drafts and the pending-frame slot
//! - `pointer`: press/move/release handling and frame flushing
//! - `drafts`: freehand, line and rectangle drafts
//! - `tools`: tool modes, layers, deletion and keyboard shortcuts
//! - `view`: fit, zoom and viewport size
//! - `file_io`: snapshot export/import, snapshot store and scene conversion

mod drafts;
mod file_io;
mod pointer;
mod session;
mod tools;
mod view;

pub use session::{DragSession, DraftVertex, LineDraft, PendingFrame, PointerId, VertexTarget};

use siteplan_core::event_bus::{
    EventBus, FeatureKind, ModelEvent, PlanEvent, SelectionEvent, ViewEvent,
};
use siteplan_core::tuning::{InteractionSettings, ScatterLimits, ViewSettings};

use crate::canvas::{Canvas, DrawingMode};
use crate::model::{FeatureRef, Point};
use crate::scatter::{self, PresetCatalog};

/// Pointer button of an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// A pointer event in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub pointer_id: PointerId,
    pub button: PointerButton,
    pub position: Point,
}

impl PointerInput {
    pub fn primary(pointer_id: PointerId, x: f64, y: f64) -> Self {
        Self {
            pointer_id,
            button: PointerButton::Primary,
            position: Point::new(x, y),
        }
    }

    pub fn secondary(pointer_id: PointerId, x: f64, y: f64) -> Self {
        Self {
            button: PointerButton::Secondary,
            ..Self::primary(pointer_id, x, y)
        }
    }

    pub fn middle(pointer_id: PointerId, x: f64, y: f64) -> Self {
        Self {
            button: PointerButton::Middle,
            ..Self::primary(pointer_id, x, y)
        }
    }
}

/// Keys with an editing meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Escape,
    Delete,
    Backspace,
}

/// Designer state for host integration.
pub struct DesignerState {
    pub canvas: Canvas,
    mode: DrawingMode,
    session: DragSession,
    pending: PendingFrame,
    /// Last applied hover position in world meters.
    hover: Option<Point>,
    freehand: Vec<Point>,
    line: LineDraft,
    interaction: InteractionSettings,
    view_settings: ViewSettings,
    scatter_limits: ScatterLimits,
    events: EventBus,
    pub is_modified: bool,
}

impl DesignerState {
    /// Creates a designer state with default tuning.
    pub fn new() -> Self {
        Self::with_settings(
            InteractionSettings::default(),
            ViewSettings::default(),
            ScatterLimits::default(),
        )
    }

    pub fn with_settings(
        interaction: InteractionSettings,
        view_settings: ViewSettings,
        scatter_limits: ScatterLimits,
    ) -> Self {
        Self {
            canvas: Canvas::with_view_settings(&view_settings),
            mode: DrawingMode::Select,
            session: DragSession::Idle,
            pending: PendingFrame::default(),
            hover: None,
            freehand: Vec::new(),
            line: LineDraft::default(),
            interaction,
            view_settings,
            scatter_limits,
            events: EventBus::new(),
            is_modified: false,
        }
    }

    /// Replaces the event bus, e.g. with one that records history.
    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn mode(&self) -> DrawingMode {
        self.mode
    }

    pub fn session(&self) -> &DragSession {
        &self.session
    }

    pub fn pending_frame(&self) -> &PendingFrame {
        &self.pending
    }

    pub fn hover_point(&self) -> Option<Point> {
        self.hover
    }

    pub fn freehand_draft(&self) -> &[Point] {
        &self.freehand
    }

    pub fn line_draft(&self) -> &LineDraft {
        &self.line
    }

    /// Corners of the rectangle being dragged, if any.
    pub fn rectangle_draft(&self) -> Option<(Point, Point)> {
        match &self.session {
            DragSession::RectangleDraft {
                corner_a, corner_b, ..
            } => Some((*corner_a, *corner_b)),
            _ => None,
        }
    }

    pub fn has_draft(&self) -> bool {
        !self.freehand.is_empty() || !self.line.is_empty()
    }

    pub fn interaction(&self) -> &InteractionSettings {
        &self.interaction
    }

    pub fn view_settings(&self) -> &ViewSettings {
        &self.view_settings
    }

    pub fn scatter_limits(&self) -> &ScatterLimits {
        &self.scatter_limits
    }

    /// Bus the state machine publishes on. Hosts subscribe here.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Scatter preview of a polygon with the configured limits. Empty for
    /// unknown polygons, non-green layers and polygons without an assignment.
    pub fn scatter_preview(&self, polygon_id: &str, catalog: &dyn PresetCatalog) -> Vec<Point> {
        let Some(polygon) = self.canvas.polygon(polygon_id) else {
            return Vec::new();
        };
        let Some(layer) = self.canvas.layer(&polygon.layer_id) else {
            return Vec::new();
        };
        scatter::preview_for_polygon(polygon, layer.kind, catalog, &self.scatter_limits)
    }

    fn screen_to_world(&self, screen: Point) -> Point {
        self.canvas.viewport().screen_to_world(screen)
    }

    /// Converts a pixel distance to world meters at the current zoom.
    fn px_to_world(&self, pixels: f64) -> f64 {
        self.canvas.viewport().screen_to_world_distance(pixels)
    }

    fn active_layer_locked(&self) -> bool {
        self.canvas.active_layer().locked
    }

    fn emit(&self, event: PlanEvent) {
        self.events.publish(event);
    }

    fn emit_model(&self, event: ModelEvent) {
        self.emit(PlanEvent::Model(event));
    }

    fn emit_committed(&self, kind: FeatureKind, id: &str) {
        let layer_id = match kind {
            FeatureKind::Polygon => self.canvas.polygon(id).map(|p| p.layer_id.clone()),
            FeatureKind::Polyline => self.canvas.polyline(id).map(|p| p.layer_id.clone()),
            FeatureKind::Image => None,
        };
        self.emit_model(ModelEvent::FeatureCommitted {
            kind,
            id: id.to_string(),
            layer_id,
        });
    }

    fn emit_updated(&self, kind: FeatureKind, id: &str) {
        self.emit_model(ModelEvent::FeatureUpdated {
            kind,
            id: id.to_string(),
        });
    }

    fn emit_selection(&self) {
        self.emit(PlanEvent::Selection(SelectionEvent::Changed {
            id: self.canvas.selected().map(|f| f.id().to_string()),
        }));
    }

    fn emit_view(&self) {
        let view = self.canvas.viewport();
        self.emit(PlanEvent::View(ViewEvent::Changed {
            scale: view.scale(),
            offset_x: view.offset().x,
            offset_y: view.offset().y,
        }));
    }

    /// Selects a feature and publishes a selection change.
    pub fn select(&mut self, feature: FeatureRef) -> bool {
        let changed = self.canvas.select(feature);
        if changed {
            self.emit_selection();
        }
        changed
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = self.canvas.clear_selection();
        if changed {
            self.emit_selection();
        }
        changed
    }
}

impl Default for DesignerState {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn feature_kind(feature: &FeatureRef) -> FeatureKind {
    match feature {
        FeatureRef::Polygon(_) => FeatureKind::Polygon,
        FeatureRef::Polyline(_) => FeatureKind::Polyline,
        FeatureRef::Image(_) => FeatureKind::Image,
    }
}
