//! Render descriptors for the planning canvas.
//! Produces world-space fill, stroke, point, image and handle items in draw
//! order; hosts draw them with any 2D API after mapping through the view
//! transform.
//!
//! Draw order:
//! - planning images (stack order)
//! - visible layers in layer order: polygon fills, polyline strokes, scatter points
//! - selection and align marker handles
//! - drafts and the hover preview

use lyon::path::Path;

use crate::canvas::{Canvas, ResizeHandle};
use crate::designer_state::DesignerState;
use crate::geometry::{self, PathCommand};
use crate::model::{FeatureRef, ImageFrame, Layer, LayerParams, Point};
use crate::scatter::{self, PresetCatalog};
use siteplan_core::tuning::ScatterLimits;

/// Opacity of features on layers other than the active one.
const INACTIVE_LAYER_OPACITY: f64 = 0.45;
const DRAFT_COLOR: &str = "#f1c40f";
const HANDLE_COLOR: &str = "#ffeb3b";
const MARKER_COLOR: &str = "#e91e63";
const SCATTER_COLOR: &str = "#1b5e20";

/// Width of a stroke: fixed on screen or a world-space extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeWidth {
    Pixels(f64),
    Meters(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Vertex,
    Resize(ResizeHandle),
    AlignMarker,
}

/// One drawable item in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderItem {
    Image {
        image_id: String,
        url: String,
        frame: ImageFrame,
        opacity: f64,
        selected: bool,
    },
    Fill {
        feature_id: String,
        layer_id: String,
        path: Vec<PathCommand>,
        color: String,
        opacity: f64,
        selected: bool,
    },
    Stroke {
        feature_id: Option<String>,
        path: Vec<PathCommand>,
        color: String,
        width: StrokeWidth,
        opacity: f64,
        selected: bool,
        dashed: bool,
    },
    Points {
        feature_id: String,
        points: Vec<Point>,
        color: String,
    },
    Handle {
        position: Point,
        kind: HandleKind,
        /// Radius in screen pixels.
        radius_px: f64,
        color: String,
    },
}

impl RenderItem {
    /// Path of a fill or stroke item as a lyon path.
    pub fn lyon_path(&self) -> Option<Path> {
        match self {
            RenderItem::Fill { path, .. } | RenderItem::Stroke { path, .. } => {
                Some(geometry::to_lyon_path(path))
            }
            _ => None,
        }
    }
}

/// Render items of a canvas without drafts. Scatter previews are only
/// produced when a catalog is given.
pub fn render_canvas(
    canvas: &Canvas,
    catalog: Option<&dyn PresetCatalog>,
    limits: &ScatterLimits,
    handle_radius_px: f64,
) -> Vec<RenderItem> {
    let mut items = Vec::new();
    let selected = canvas.selected();

    for image in canvas.images().iter().filter(|i| i.visible) {
        items.push(RenderItem::Image {
            image_id: image.id.clone(),
            url: image.url.clone(),
            frame: image.frame(),
            opacity: image.opacity,
            selected: selected == Some(&FeatureRef::Image(image.id.clone())),
        });
    }

    for layer in canvas.layers().iter().filter(|l| l.visible) {
        let opacity = if layer.id == canvas.active_layer_id() {
            1.0
        } else {
            INACTIVE_LAYER_OPACITY
        };
        let smoothing = layer.params().smoothing();

        for polygon in canvas.polygons().iter().filter(|p| p.layer_id == layer.id) {
            items.push(RenderItem::Fill {
                feature_id: polygon.id.clone(),
                layer_id: layer.id.clone(),
                path: geometry::rounded_polygon_path(&polygon.points, smoothing),
                color: layer.color.clone(),
                opacity,
                selected: selected == Some(&FeatureRef::Polygon(polygon.id.clone())),
            });
            if let Some(catalog) = catalog {
                let points = scatter::preview_for_polygon(polygon, layer.kind, catalog, limits);
                if !points.is_empty() {
                    items.push(RenderItem::Points {
                        feature_id: polygon.id.clone(),
                        points,
                        color: SCATTER_COLOR.to_string(),
                    });
                }
            }
        }

        for polyline in canvas.polylines().iter().filter(|p| p.layer_id == layer.id) {
            let points = canvas.polyline_points(polyline);
            items.push(RenderItem::Stroke {
                feature_id: Some(polyline.id.clone()),
                path: geometry::rounded_polyline_path(&points, smoothing),
                color: layer.color.clone(),
                width: polyline_width(layer),
                opacity,
                selected: selected == Some(&FeatureRef::Polyline(polyline.id.clone())),
                dashed: false,
            });
        }
    }

    push_selection_handles(canvas, handle_radius_px, &mut items);

    for image in canvas.images().iter().filter(|i| i.visible) {
        if let Some(position) = image.marker_world() {
            items.push(RenderItem::Handle {
                position,
                kind: HandleKind::AlignMarker,
                radius_px: handle_radius_px,
                color: MARKER_COLOR.to_string(),
            });
        }
    }

    items
}

/// Render items of the whole editor, drafts and hover preview included.
pub fn render_state(state: &DesignerState, catalog: Option<&dyn PresetCatalog>) -> Vec<RenderItem> {
    let handle_radius = state.interaction().handle_radius_px;
    let mut items = render_canvas(&state.canvas, catalog, state.scatter_limits(), handle_radius);
    let hover = state.hover_point();

    if let Some((a, b)) = state.rectangle_draft() {
        let corners = [
            Point::new(a.x.min(b.x), a.y.min(b.y)),
            Point::new(a.x.max(b.x), a.y.min(b.y)),
            Point::new(a.x.max(b.x), a.y.max(b.y)),
            Point::new(a.x.min(b.x), a.y.max(b.y)),
        ];
        items.push(draft_stroke(geometry::sharp_polygon_path(&corners)));
    }

    let freehand = state.freehand_draft();
    if !freehand.is_empty() {
        let mut points = freehand.to_vec();
        points.extend(hover);
        items.push(draft_stroke(geometry::polyline_path(&points)));
        push_draft_vertices(freehand, handle_radius, &mut items);
    }

    let line = state.line_draft();
    if !line.is_empty() {
        let mut points = line.points();
        let drafted = points.clone();
        points.extend(hover);
        items.push(draft_stroke(geometry::polyline_path(&points)));
        push_draft_vertices(&drafted, handle_radius, &mut items);
    }

    items
}

fn polyline_width(layer: &Layer) -> StrokeWidth {
    match layer.params() {
        LayerParams::Road { width_m, .. } => StrokeWidth::Meters(width_m),
        LayerParams::Wall { thickness_m, .. } => StrokeWidth::Meters(thickness_m),
        _ => StrokeWidth::Pixels(2.0),
    }
}

fn push_selection_handles(canvas: &Canvas, radius_px: f64, items: &mut Vec<RenderItem>) {
    let handle = |position, kind| RenderItem::Handle {
        position,
        kind,
        radius_px,
        color: HANDLE_COLOR.to_string(),
    };

    match canvas.selected() {
        Some(FeatureRef::Polygon(id)) => {
            if let Some(polygon) = canvas.polygon(id) {
                items.extend(polygon.points.iter().map(|p| handle(*p, HandleKind::Vertex)));
            }
        }
        Some(FeatureRef::Polyline(id)) => {
            let Some(polyline) = canvas.polyline(id) else {
                return;
            };
            let linear = canvas
                .layer(&polyline.layer_id)
                .is_some_and(|l| l.kind.is_linear());
            if !linear {
                let points = canvas.polyline_points(polyline);
                items.extend(points.into_iter().map(|p| handle(p, HandleKind::Vertex)));
            }
        }
        Some(FeatureRef::Image(id)) => {
            if let Some(image) = canvas.image(id).filter(|i| !i.locked) {
                let frame = image.frame();
                items.extend(
                    ResizeHandle::ALL
                        .iter()
                        .map(|h| handle(h.position(&frame), HandleKind::Resize(*h))),
                );
            }
        }
        None => {}
    }
}

fn draft_stroke(path: Vec<PathCommand>) -> RenderItem {
    RenderItem::Stroke {
        feature_id: None,
        path,
        color: DRAFT_COLOR.to_string(),
        width: StrokeWidth::Pixels(2.0),
        opacity: 1.0,
        selected: false,
        dashed: true,
    }
}

fn push_draft_vertices(points: &[Point], radius_px: f64, items: &mut Vec<RenderItem>) {
    items.extend(points.iter().map(|p| RenderItem::Handle {
        position: *p,
        kind: HandleKind::Vertex,
        radius_px: radius_px / 2.0,
        color: DRAFT_COLOR.to_string(),
    }));
}
