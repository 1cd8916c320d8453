//! Opaque identifier generation.
//!
//! Every layer, feature, image and polyline vertex gets a process-generated
//! id of the form `<prefix>-<uuid>`. Ids are never reused.

use uuid::Uuid;

/// Id prefixes used by the engine.
pub mod prefix {
    pub const LAYER: &str = "layer";
    pub const POLYGON: &str = "polygon";
    pub const POLYLINE: &str = "polyline";
    pub const VERTEX: &str = "vertex";
    pub const IMAGE: &str = "image";
}

/// Generates a new unique id with the given prefix.
pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}
