//! Distance- and degree-based centrality

use super::common::{GraphView, NodeId};
use super::pathfinding::bfs_distances;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

/// Harmonic closeness: `Σ 1/d(u, v)` over reachable `v != u`, divided by `n - 1`.
///
/// One BFS per node, run in parallel.
pub fn harmonic_closeness(view: &GraphView) -> HashMap<NodeId, f64> {
    let n = view.node_count;
    if n == 0 {
        return HashMap::new();
    }
    let norm = if n > 1 { (n - 1) as f64 } else { 1.0 };

    (0..n)
        .into_par_iter()
        .map(|u| {
            let sum: f64 = bfs_distances(view, u)
                .into_iter()
                .flatten()
                .filter(|&d| d > 0)
                .map(|d| 1.0 / d as f64)
                .sum();
            (view.index_to_node[u], sum / norm)
        })
        .collect()
}

/// Number of distinct neighbours per node (parallel arcs counted once).
pub fn degree_centrality(view: &GraphView) -> HashMap<NodeId, f64> {
    (0..view.node_count)
        .map(|u| {
            let distinct: HashSet<usize> = view
                .successors(u)
                .iter()
                .chain(view.predecessors(u))
                .copied()
                .filter(|&v| v != u)
                .collect();
            (view.index_to_node[u], distinct.len() as f64)
        })
        .collect()
}
