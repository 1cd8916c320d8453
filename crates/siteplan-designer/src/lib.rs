//! # Siteplan Designer
//!
//! Interactive 2D site-planning canvas engine. Users trace terrain, building
//! footprints, roads, walls, floors and water over reference images, assign
//! vegetation presets to regions and hand the result to an external 3D
//! scene converter.
//!
//! ## Core Components
//!
//! ### Geometry and View
//! - **Geometry**: winding-rule hit testing, area, centroid, arc length,
//!   segment distance and rounded-corner paths
//! - **Viewport**: world meters to screen pixels, fit, anchored zoom and pan
//!
//! ### Model
//! - **Layers**: terrain, building, road, green, wall, floor and water
//! - **Features**: polygons, polylines over a shared vertex arena, planning images
//! - **Scatter**: reproducible minimum-distance placement inside green polygons
//!
//! ### Editing
//! - **Canvas**: feature storage, hit testing, image alignment and resizing
//! - **Designer state**: tool modes, drag sessions, drafts, per-frame pointer
//!   coalescing and planning events
//! - **Renderer**: world-space draw descriptors
//!
//! ### Boundaries
//! - **Serialization**: the persisted planning snapshot
//! - **Persistence**: file-backed snapshot store
//! - **Conversion**: the external scene converter interface
//!
//! ## Architecture
//!
//! ```text
//! DesignerState (input, sessions, drafts, events)
//!   └── Canvas (layers, features, vertex arena, selection)
//!         ├── Geometry (hit testing, paths)
//!         └── ViewTransform (pan/zoom)
//!
//! Scatter (preview points from polygon + assignment)
//! PlanningSnapshot ── PlanStore / SceneConverter
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use siteplan_designer::{DesignerState, DrawingMode, PointerInput};
//!
//! let mut state = DesignerState::new();
//! state.set_mode(DrawingMode::Rectangle).unwrap();
//!
//! state.on_pointer_down(PointerInput::primary(1, 0.0, 0.0));
//! state.on_pointer_move(PointerInput::primary(1, 40.0, 40.0));
//! state.flush_frame();
//! state.on_pointer_up(PointerInput::primary(1, 40.0, 40.0));
//!
//! assert_eq!(state.canvas.polygons().len(), 1);
//! ```

pub mod canvas;
pub mod conversion;
pub mod designer_state;
pub mod geometry;
pub mod model;
pub mod persistence;
pub mod renderer;
pub mod scatter;
pub mod selection_manager;
pub mod serialization;
pub mod viewport;

pub use canvas::{Canvas, DrawingMode, Endpoint, EndpointHit, HitTarget, ResizeHandle};
pub use conversion::{ConversionProgress, SceneConverter};
pub use designer_state::{
    DesignerState, DragSession, Key, LineDraft, PendingFrame, PointerButton, PointerId,
    PointerInput,
};
pub use geometry::{Bounds, PathCommand};
pub use model::{
    FeatureRef, ImageFrame, Layer, LayerKind, LayerParams, PlanPolygon, PlanPolyline,
    PlanningImage, Point, ScatterAssignment, VertexId, VertexStore,
};
pub use persistence::{PlanStore, StoredPlan};
pub use renderer::{render_canvas, render_state, HandleKind, RenderItem, StrokeWidth};
pub use scatter::{PresetCatalog, ScatterPreset, StaticPresetCatalog};
pub use selection_manager::SelectionManager;
pub use serialization::{DecodeReport, PlanningSnapshot};
pub use viewport::{FixedGround, GroundSizeProvider, ViewTransform};
