//! Canvas type definitions: DrawingMode, ResizeHandle, Endpoint, HitTarget.

use std::fmt;

use crate::model::{ImageFrame, LayerKind, Point, VertexId};

/// Tool modes selectable by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawingMode {
    Select,
    Pan,
    Rectangle,
    FreehandPolygon,
    Line,
    AlignMarker,
}

impl DrawingMode {
    pub const ALL: [DrawingMode; 6] = [
        DrawingMode::Select,
        DrawingMode::Pan,
        DrawingMode::Rectangle,
        DrawingMode::FreehandPolygon,
        DrawingMode::Line,
        DrawingMode::AlignMarker,
    ];

    /// Road and wall layers are line-only; every other layer refuses the
    /// line tool. Non-drawing tools work everywhere.
    pub fn allowed_on(&self, kind: LayerKind) -> bool {
        match self {
            DrawingMode::Rectangle | DrawingMode::FreehandPolygon => !kind.is_linear(),
            DrawingMode::Line => kind.is_linear(),
            DrawingMode::Select | DrawingMode::Pan | DrawingMode::AlignMarker => true,
        }
    }

    /// Tools driven by clicks rather than drags.
    pub fn is_click_driven(&self) -> bool {
        matches!(self, DrawingMode::FreehandPolygon | DrawingMode::Line)
    }
}

impl fmt::Display for DrawingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DrawingMode::Select => "select",
            DrawingMode::Pan => "pan",
            DrawingMode::Rectangle => "rectangle",
            DrawingMode::FreehandPolygon => "freehand polygon",
            DrawingMode::Line => "line",
            DrawingMode::AlignMarker => "align marker",
        };
        f.write_str(name)
    }
}

/// One of the eight image resize handles. Screen and world are y-down, so
/// north is the edge with the smaller y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::NW,
        ResizeHandle::N,
        ResizeHandle::NE,
        ResizeHandle::E,
        ResizeHandle::SE,
        ResizeHandle::S,
        ResizeHandle::SW,
        ResizeHandle::W,
    ];

    pub fn moves_left(&self) -> bool {
        matches!(self, ResizeHandle::W | ResizeHandle::NW | ResizeHandle::SW)
    }

    pub fn moves_right(&self) -> bool {
        matches!(self, ResizeHandle::E | ResizeHandle::NE | ResizeHandle::SE)
    }

    pub fn moves_top(&self) -> bool {
        matches!(self, ResizeHandle::N | ResizeHandle::NE | ResizeHandle::NW)
    }

    pub fn moves_bottom(&self) -> bool {
        matches!(self, ResizeHandle::S | ResizeHandle::SE | ResizeHandle::SW)
    }

    /// Handle position on a frame.
    pub fn position(&self, frame: &ImageFrame) -> Point {
        let x = if self.moves_left() {
            frame.x
        } else if self.moves_right() {
            frame.right()
        } else {
            frame.x + frame.w / 2.0
        };
        let y = if self.moves_top() {
            frame.y
        } else if self.moves_bottom() {
            frame.bottom()
        } else {
            frame.y + frame.h / 2.0
        };
        Point::new(x, y)
    }
}

/// End of a polyline a draft continues from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

/// A polyline endpoint found near the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointHit {
    pub polyline_id: String,
    pub endpoint: Endpoint,
    pub vertex: VertexId,
}

/// Result of hit-testing the canvas, in priority order.
#[derive(Debug, Clone, PartialEq)]
pub enum HitTarget {
    PolygonVertex { polygon_id: String, index: usize },
    PolylineVertex { polyline_id: String, vertex: VertexId },
    ResizeHandle { image_id: String, handle: ResizeHandle },
    Polyline(String),
    Polygon(String),
    Image(String),
}
