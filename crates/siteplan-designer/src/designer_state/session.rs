//! Drag sessions, drafts and the pending-frame slot.

use crate::canvas::{Endpoint, ResizeHandle};
use crate::model::{ImageFrame, Point, VertexId};

/// Identity of the pointer that started a session.
pub type PointerId = u64;

/// Vertex grabbed by a [`DragSession::DragVertex`] session.
#[derive(Debug, Clone, PartialEq)]
pub enum VertexTarget {
    Polygon { polygon_id: String, index: usize },
    Polyline { polyline_id: String, vertex: VertexId },
}

/// The active pointer session. Exactly one is active; every variant except
/// `Idle` carries the pointer that started it. Captured start geometry is
/// never modified while the session lives.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragSession {
    #[default]
    Idle,
    /// Press of a click-driven tool; becomes a click on release unless the
    /// pointer travelled beyond the click slop.
    PendingClick {
        pointer_id: PointerId,
        start_screen: Point,
        moved: bool,
    },
    RectangleDraft {
        pointer_id: PointerId,
        corner_a: Point,
        corner_b: Point,
    },
    /// `cancel_on_click` marks a secondary-button press: releasing it without
    /// travel cancels drafts instead of panning.
    Pan {
        pointer_id: PointerId,
        start_screen: Point,
        start_offset: Point,
        moved: bool,
        cancel_on_click: bool,
    },
    MovePolygon {
        pointer_id: PointerId,
        polygon_id: String,
        start_world: Point,
        start_points: Vec<Point>,
    },
    MovePolyline {
        pointer_id: PointerId,
        polyline_id: String,
        start_world: Point,
        start_vertices: Vec<(VertexId, Point)>,
    },
    MoveImage {
        pointer_id: PointerId,
        image_id: String,
        start_world: Point,
        start_position: Point,
    },
    ResizeImage {
        pointer_id: PointerId,
        image_id: String,
        handle: ResizeHandle,
        start_world: Point,
        start_frame: ImageFrame,
    },
    /// `click_on_release` is set by the line tool: a release without travel
    /// is a line click on the vertex instead of a drag.
    DragVertex {
        pointer_id: PointerId,
        target: VertexTarget,
        start_screen: Point,
        start_world: Point,
        start_point: Point,
        moved: bool,
        click_on_release: bool,
    },
    MoveAlignMarker {
        pointer_id: PointerId,
        image_id: String,
    },
}

impl DragSession {
    pub fn pointer_id(&self) -> Option<PointerId> {
        match self {
            DragSession::Idle => None,
            DragSession::PendingClick { pointer_id, .. }
            | DragSession::RectangleDraft { pointer_id, .. }
            | DragSession::Pan { pointer_id, .. }
            | DragSession::MovePolygon { pointer_id, .. }
            | DragSession::MovePolyline { pointer_id, .. }
            | DragSession::MoveImage { pointer_id, .. }
            | DragSession::ResizeImage { pointer_id, .. }
            | DragSession::DragVertex { pointer_id, .. }
            | DragSession::MoveAlignMarker { pointer_id, .. } => Some(*pointer_id),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, DragSession::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            DragSession::Idle => "idle",
            DragSession::PendingClick { .. } => "pending click",
            DragSession::RectangleDraft { .. } => "rectangle draft",
            DragSession::Pan { .. } => "pan",
            DragSession::MovePolygon { .. } => "move polygon",
            DragSession::MovePolyline { .. } => "move polyline",
            DragSession::MoveImage { .. } => "move image",
            DragSession::ResizeImage { .. } => "resize image",
            DragSession::DragVertex { .. } => "drag vertex",
            DragSession::MoveAlignMarker { .. } => "move align marker",
        }
    }
}

/// A point of a line draft. Shared points reuse an existing vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftVertex {
    pub id: VertexId,
    pub point: Point,
    pub shared: bool,
}

/// Polyline under construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineDraft {
    pub vertices: Vec<DraftVertex>,
    /// Existing polyline being extended from one of its ends.
    pub continuation: Option<(String, Endpoint)>,
}

impl LineDraft {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn points(&self) -> Vec<Point> {
        self.vertices.iter().map(|v| v.point).collect()
    }

    pub fn last(&self) -> Option<&DraftVertex> {
        self.vertices.last()
    }
}

/// Latest unapplied pointer positions (screen pixels). Last writer wins.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PendingFrame {
    pub session_pointer: Option<Point>,
    pub hover: Option<Point>,
}

impl PendingFrame {
    pub fn is_empty(&self) -> bool {
        self.session_pointer.is_none() && self.hover.is_none()
    }

    pub fn take(&mut self) -> PendingFrame {
        std::mem::take(self)
    }
}
