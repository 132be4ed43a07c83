//! Keyword graph model
//!
//! This module implements the per-period co-occurrence graph with:
//! - Vertices identified by label, carrying a surrogate id (REQ-GRAPH-001)
//! - Undirected edges with contributor usage counts (REQ-GRAPH-002)
//! - Explicit id sequences instead of global counters (REQ-GRAPH-003)
//! - Per-vertex weight signals used as propagation denominators (REQ-GRAPH-004)

pub mod edge;
pub mod store;
pub mod types;
pub mod vertex;
pub mod weights;

// Re-export main types
pub use edge::{EdgeInsert, KeywordEdge};
pub use store::{GraphError, GraphResult, KeywordGraph};
pub use types::{EdgeId, IdSequence, Label, VertexId};
pub use vertex::Vertex;
pub use weights::{VertexWeights, Weighting};
