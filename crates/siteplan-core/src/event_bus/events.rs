//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable so hosts can log or forward them.

use serde::{Deserialize, Serialize};

/// Root event enum for all planning events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlanEvent {
    /// Layers, polygons, polylines and images
    Model(ModelEvent),
    /// Selection changes
    Selection(SelectionEvent),
    /// Zoom and pan changes
    View(ViewEvent),
    /// Snapshot export/import
    Snapshot(SnapshotEvent),
    /// External 3D conversion
    Conversion(ConversionEvent),
}

impl PlanEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            PlanEvent::Model(_) => EventCategory::Model,
            PlanEvent::Selection(_) => EventCategory::Selection,
            PlanEvent::View(_) => EventCategory::View,
            PlanEvent::Snapshot(_) => EventCategory::Snapshot,
            PlanEvent::Conversion(_) => EventCategory::Conversion,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            PlanEvent::Model(e) => e.description(),
            PlanEvent::Selection(SelectionEvent::Changed { id }) => match id {
                Some(id) => format!("Selected {}", id),
                None => "Selection cleared".to_string(),
            },
            PlanEvent::View(ViewEvent::Changed { scale, .. }) => {
                format!("View changed (scale {:.3})", scale)
            }
            PlanEvent::Snapshot(e) => match e {
                SnapshotEvent::Flushed { empty } => format!("Snapshot flushed (empty: {})", empty),
                SnapshotEvent::Loaded { features } => format!("Snapshot loaded ({} features)", features),
            },
            PlanEvent::Conversion(e) => match e {
                ConversionEvent::Progress { step, percent } => format!("{}: {:.0}%", step, percent),
                ConversionEvent::Finished => "Conversion finished".to_string(),
                ConversionEvent::Failed { message } => format!("Conversion failed: {}", message),
            },
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    Model,
    Selection,
    View,
    Snapshot,
    Conversion,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Model => write!(f, "Model"),
            EventCategory::Selection => write!(f, "Selection"),
            EventCategory::View => write!(f, "View"),
            EventCategory::Snapshot => write!(f, "Snapshot"),
            EventCategory::Conversion => write!(f, "Conversion"),
        }
    }
}

/// Kind of planning feature an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    Polygon,
    Polyline,
    Image,
}

/// Model mutation events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelEvent {
    /// A draft was committed as a new feature.
    FeatureCommitted {
        kind: FeatureKind,
        id: String,
        layer_id: Option<String>,
    },
    /// Geometry of an existing feature changed (move, vertex drag, resize, extension).
    FeatureUpdated { kind: FeatureKind, id: String },
    /// A feature was deleted.
    FeatureDeleted { kind: FeatureKind, id: String },
    /// A layer was added.
    LayerAdded { id: String },
    /// A layer and its features were removed.
    LayerRemoved { id: String },
    /// Layer name, visibility, lock or parameters changed.
    LayerUpdated { id: String },
    /// The active layer changed.
    ActiveLayerChanged { id: String },
}

impl ModelEvent {
    fn description(&self) -> String {
        match self {
            ModelEvent::FeatureCommitted { kind, id, .. } => format!("{:?} {} committed", kind, id),
            ModelEvent::FeatureUpdated { kind, id } => format!("{:?} {} updated", kind, id),
            ModelEvent::FeatureDeleted { kind, id } => format!("{:?} {} deleted", kind, id),
            ModelEvent::LayerAdded { id } => format!("Layer {} added", id),
            ModelEvent::LayerRemoved { id } => format!("Layer {} removed", id),
            ModelEvent::LayerUpdated { id } => format!("Layer {} updated", id),
            ModelEvent::ActiveLayerChanged { id } => format!("Active layer {}", id),
        }
    }
}

/// Selection events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectionEvent {
    Changed { id: Option<String> },
}

/// View transform events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViewEvent {
    Changed {
        scale: f64,
        offset_x: f64,
        offset_y: f64,
    },
}

/// Snapshot events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SnapshotEvent {
    /// A fully flushed snapshot was produced.
    Flushed { empty: bool },
    /// The model was replaced from a snapshot.
    Loaded { features: usize },
}

/// Conversion progress events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConversionEvent {
    Progress { step: String, percent: f64 },
    Finished,
    Failed { message: String },
}
