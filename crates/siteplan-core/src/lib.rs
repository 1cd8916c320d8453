//! # Siteplan Core
//!
//! Core types and utilities shared by the site-planning crates:
//! error taxonomy, coordinate and range constants, tunable parameters,
//! id generation and the planning event bus.

pub mod constants;
pub mod error;
pub mod event_bus;
pub mod ids;
pub mod tuning;

pub use error::{ConversionError, Error, ModelError, PersistenceError, Result, SnapshotError};

pub use event_bus::{
    ConversionEvent, EventBus, EventBusConfig, EventCategory, EventFilter, FeatureKind, ModelEvent,
    PlanEvent, SelectionEvent, SnapshotEvent, SubscriptionId, ViewEvent,
};

pub use tuning::{InteractionSettings, ScatterLimits, ViewSettings};
