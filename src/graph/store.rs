//! In-memory keyword graph
//!
//! One graph per period. Vertices are unique by label, edges are unique per
//! unordered vertex pair, and adjacency keeps insertion order so that every
//! traversal (and therefore every seeded cascade) is reproducible.

use super::edge::{ordered_pair, EdgeInsert, KeywordEdge};
use super::types::{EdgeId, IdSequence, Label, VertexId};
use super::vertex::Vertex;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Errors that can occur during graph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Vertex {0} not found")]
    VertexNotFound(VertexId),

    #[error("Vertex labelled '{0}' not found")]
    LabelNotFound(Label),

    #[error("Vertex {id} already exists with label '{existing}'")]
    VertexIdConflict { id: VertexId, existing: Label },

    #[error("Label '{label}' already belongs to {existing}")]
    LabelConflict { label: Label, existing: VertexId },
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Undirected, weighted keyword co-occurrence graph
///
/// - vertices: VertexId -> Vertex, in insertion order
/// - by_label: Label -> VertexId
/// - edges: EdgeId -> KeywordEdge, in insertion order
/// - pairs: (min id, max id) -> EdgeId
/// - adjacency: VertexId -> neighbours in insertion order
#[derive(Debug, Clone)]
pub struct KeywordGraph {
    ids: IdSequence,
    vertices: IndexMap<VertexId, Vertex>,
    by_label: HashMap<Label, VertexId>,
    edges: IndexMap<EdgeId, KeywordEdge>,
    pairs: HashMap<(VertexId, VertexId), EdgeId>,
    adjacency: HashMap<VertexId, Vec<VertexId>>,
    next_edge_id: u64,
}

impl KeywordGraph {
    /// Create an empty graph with its own id sequence
    pub fn new() -> Self {
        Self::with_sequence(IdSequence::new())
    }

    /// Create an empty graph that draws vertex ids from `ids`
    pub fn with_sequence(ids: IdSequence) -> Self {
        KeywordGraph {
            ids,
            vertices: IndexMap::new(),
            by_label: HashMap::new(),
            edges: IndexMap::new(),
            pairs: HashMap::new(),
            adjacency: HashMap::new(),
            next_edge_id: 1,
        }
    }

    pub fn sequence(&self) -> &IdSequence {
        &self.ids
    }

    /// Return the vertex for `label`, creating it if needed
    pub fn add_vertex(&mut self, label: impl Into<Label>) -> VertexId {
        let label = label.into();
        if let Some(&id) = self.by_label.get(&label) {
            return id;
        }
        let id = self.ids.next_id();
        self.insert_vertex(Vertex::new(id, label));
        id
    }

    /// Insert a vertex with a caller-chosen id (used when loading records)
    pub fn add_vertex_with_id(&mut self, id: VertexId, label: impl Into<Label>) -> GraphResult<VertexId> {
        let label = label.into();
        if let Some(existing) = self.vertices.get(&id) {
            if existing.label == label {
                return Ok(id);
            }
            return Err(GraphError::VertexIdConflict {
                id,
                existing: existing.label.clone(),
            });
        }
        if let Some(&existing) = self.by_label.get(&label) {
            return Err(GraphError::LabelConflict { label, existing });
        }
        self.ids.observe(id);
        self.insert_vertex(Vertex::new(id, label));
        Ok(id)
    }

    fn insert_vertex(&mut self, vertex: Vertex) {
        self.by_label.insert(vertex.label.clone(), vertex.id);
        self.adjacency.insert(vertex.id, Vec::new());
        self.vertices.insert(vertex.id, vertex);
    }

    /// Record `count` uses of the pair `{a, b}` by `contributor`
    pub fn add_edge(
        &mut self,
        a: VertexId,
        b: VertexId,
        contributor: impl Into<String>,
        count: u64,
    ) -> GraphResult<EdgeInsert> {
        let mut contributors = BTreeMap::new();
        contributors.insert(contributor.into(), count);
        self.add_edge_with_contributors(a, b, &contributors)
    }

    /// Insert or merge the edge `{a, b}` with a full contributor map
    pub fn add_edge_with_contributors(
        &mut self,
        a: VertexId,
        b: VertexId,
        contributors: &BTreeMap<String, u64>,
    ) -> GraphResult<EdgeInsert> {
        if !self.vertices.contains_key(&a) {
            return Err(GraphError::VertexNotFound(a));
        }
        if !self.vertices.contains_key(&b) {
            return Err(GraphError::VertexNotFound(b));
        }
        if a == b {
            return Ok(EdgeInsert::SkippedSelfLoop);
        }

        let key = ordered_pair(a, b);
        if let Some(&edge_id) = self.pairs.get(&key) {
            if let Some(edge) = self.edges.get_mut(&edge_id) {
                edge.merge_contributors(contributors);
            }
            return Ok(EdgeInsert::Merged(edge_id));
        }

        let edge_id = EdgeId::new(self.next_edge_id);
        self.next_edge_id += 1;

        let mut edge = KeywordEdge::new(edge_id, a, b);
        edge.merge_contributors(contributors);
        self.edges.insert(edge_id, edge);
        self.pairs.insert(key, edge_id);
        self.adjacency.entry(a).or_default().push(b);
        self.adjacency.entry(b).or_default().push(a);

        Ok(EdgeInsert::Created(edge_id))
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    pub fn vertex_by_label(&self, label: &str) -> Option<&Vertex> {
        self.by_label
            .get(&Label::new(label))
            .and_then(|id| self.vertices.get(id))
    }

    /// Resolve an id, failing with [`GraphError::VertexNotFound`]
    pub fn require(&self, id: VertexId) -> GraphResult<&Vertex> {
        self.vertices.get(&id).ok_or(GraphError::VertexNotFound(id))
    }

    pub fn contains(&self, id: VertexId) -> bool {
        self.vertices.contains_key(&id)
    }

    /// Neighbours of `v` in insertion order; empty for unknown vertices
    pub fn neighbors(&self, v: VertexId) -> &[VertexId] {
        self.adjacency.get(&v).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edge(&self, id: EdgeId) -> Option<&KeywordEdge> {
        self.edges.get(&id)
    }

    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<&KeywordEdge> {
        self.pairs
            .get(&ordered_pair(a, b))
            .and_then(|id| self.edges.get(id))
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.keys().copied()
    }

    pub fn edges(&self) -> impl Iterator<Item = &KeywordEdge> {
        self.edges.values()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

impl Default for KeywordGraph {
    fn default() -> Self {
        Self::new()
    }
}
