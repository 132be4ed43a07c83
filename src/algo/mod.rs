//! Graph algorithms module
//!
//! Centrality and component algorithms live in the
//! `topicflow-graph-algorithms` crate. This module provides the
//! integration/adapter layer from [`KeywordGraph`] to its CSR view.

use crate::graph::{KeywordGraph, VertexId};
use topicflow_graph_algorithms::{GraphView, NodeId as AlgoNodeId};

// Re-export algorithms
pub use topicflow_graph_algorithms::{
    degree_centrality, harmonic_closeness, local_clustering_coefficient, page_rank,
    weakly_connected_components, PageRankConfig, WccResult,
};

/// Build a symmetric GraphView of the keyword graph.
///
/// Every undirected edge is stored in both directions, weighted by its usage.
/// Dense indices follow vertex insertion order.
pub fn build_view(graph: &KeywordGraph) -> GraphView {
    let nodes: Vec<AlgoNodeId> = graph.vertex_ids().map(|v| v.as_u64()).collect();
    let pairs: Vec<(AlgoNodeId, AlgoNodeId, f64)> = graph
        .edges()
        .map(|e| (e.source.as_u64(), e.target.as_u64(), e.usage() as f64))
        .collect();
    GraphView::undirected(&nodes, &pairs)
}

/// Map an algorithm result keyed by raw node ids back to vertex ids
pub fn to_vertex_scores(
    scores: std::collections::HashMap<AlgoNodeId, f64>,
) -> std::collections::HashMap<VertexId, f64> {
    scores.into_iter().map(|(id, s)| (VertexId::new(id), s)).collect()
}
