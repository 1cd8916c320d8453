//! # Event Bus Module
//!
//! Publish/subscribe channel through which hosts observe the planning engine.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use siteplan_core::event_bus::{EventBus, EventCategory, EventFilter, PlanEvent};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Model]),
//!     |event| println!("{}", event.description()),
//! );
//!
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
