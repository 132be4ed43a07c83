//! Graph topology analysis algorithms
//!
//! Local clustering coefficient, counting links among each node's neighbours.

use super::common::{GraphView, NodeId};
use std::collections::{HashMap, HashSet};

fn neighbor_set(view: &GraphView, u: usize) -> HashSet<usize> {
    view.successors(u)
        .iter()
        .chain(view.predecessors(u))
        .copied()
        .filter(|&v| v != u)
        .collect()
}

/// Local clustering coefficient per node.
///
/// `2 · links among neighbours / (k · (k - 1))`; nodes with fewer than two
/// neighbours score 0.
pub fn local_clustering_coefficient(view: &GraphView) -> HashMap<NodeId, f64> {
    let neighbors: Vec<HashSet<usize>> = (0..view.node_count).map(|u| neighbor_set(view, u)).collect();

    (0..view.node_count)
        .map(|u| {
            let k = neighbors[u].len();
            let coefficient = if k < 2 {
                0.0
            } else {
                let links = neighbors[u]
                    .iter()
                    .map(|&v| neighbors[v].iter().filter(|w| neighbors[u].contains(w)).count())
                    .sum::<usize>()
                    / 2;
                2.0 * links as f64 / (k * (k - 1)) as f64
            };
            (view.index_to_node[u], coefficient)
        })
        .collect()
}
