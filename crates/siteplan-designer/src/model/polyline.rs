use serde::{Deserialize, Serialize};
use siteplan_core::ids::{new_id, prefix};
use std::collections::{HashMap, HashSet};

use super::{Point, ScatterAssignment};

/// Stable identity of a polyline vertex. Several polylines may reference the
/// same vertex; moving it moves every line through it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(String);

impl VertexId {
    pub fn generate() -> Self {
        Self(new_id(prefix::VERTEX))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VertexId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for VertexId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved vertex: identity plus position.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    pub point: Point,
}

/// Id-keyed arena of polyline vertices.
#[derive(Debug, Clone, Default)]
pub struct VertexStore {
    vertices: HashMap<VertexId, Point>,
}

impl VertexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex under a fresh id.
    pub fn insert(&mut self, point: Point) -> VertexId {
        let id = VertexId::generate();
        self.vertices.insert(id.clone(), point);
        id
    }

    /// Adds or replaces a vertex under a known id.
    pub fn insert_with_id(&mut self, id: VertexId, point: Point) {
        self.vertices.insert(id, point);
    }

    pub fn get(&self, id: &VertexId) -> Option<Point> {
        self.vertices.get(id).copied()
    }

    /// Moves an existing vertex. Returns false if the id is unknown.
    pub fn set(&mut self, id: &VertexId, point: Point) -> bool {
        match self.vertices.get_mut(id) {
            Some(slot) => {
                *slot = point;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &VertexId) -> Option<Point> {
        self.vertices.remove(id)
    }

    pub fn contains(&self, id: &VertexId) -> bool {
        self.vertices.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Positions for a list of ids; unknown ids are skipped.
    pub fn resolve(&self, ids: &[VertexId]) -> Vec<Point> {
        ids.iter().filter_map(|id| self.get(id)).collect()
    }

    /// Drops every vertex not contained in `referenced`.
    pub fn retain_referenced(&mut self, referenced: &HashSet<&VertexId>) -> usize {
        let before = self.vertices.len();
        self.vertices.retain(|id, _| referenced.contains(id));
        before - self.vertices.len()
    }
}

/// An open line on a layer (road centreline, wall run...).
#[derive(Debug, Clone, PartialEq)]
pub struct PlanPolyline {
    pub id: String,
    pub name: String,
    pub layer_id: String,
    pub vertices: Vec<VertexId>,
    pub scatter: Option<ScatterAssignment>,
}

impl PlanPolyline {
    pub fn new(layer_id: impl Into<String>, vertices: Vec<VertexId>) -> Self {
        Self {
            id: new_id(prefix::POLYLINE),
            name: "Line".to_string(),
            layer_id: layer_id.into(),
            vertices,
            scatter: None,
        }
    }

    pub fn first(&self) -> Option<&VertexId> {
        self.vertices.first()
    }

    pub fn last(&self) -> Option<&VertexId> {
        self.vertices.last()
    }

    pub fn points(&self, store: &VertexStore) -> Vec<Point> {
        store.resolve(&self.vertices)
    }

    /// Unique vertex ids in first-seen order.
    pub fn unique_vertices(&self) -> Vec<VertexId> {
        let mut seen = HashSet::new();
        self.vertices
            .iter()
            .filter(|id| seen.insert(*id))
            .cloned()
            .collect()
    }
}
