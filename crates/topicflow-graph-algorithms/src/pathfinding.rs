//! Pathfinding algorithms
//!
//! Unweighted single-source distances, the building block of closeness scores.

use super::common::GraphView;
use std::collections::VecDeque;

/// Breadth-First Search distances (in hops) from `source_idx` to every node.
///
/// Unreachable nodes are `None`; the source itself is `Some(0)`.
pub fn bfs_distances(view: &GraphView, source_idx: usize) -> Vec<Option<usize>> {
    let mut distances = vec![None; view.node_count];
    if source_idx >= view.node_count {
        return distances;
    }

    let mut queue = VecDeque::new();
    distances[source_idx] = Some(0);
    queue.push_back(source_idx);

    while let Some(current_idx) = queue.pop_front() {
        let next_dist = distances[current_idx].map(|d| d + 1);
        for &next_idx in view.successors(current_idx) {
            if distances[next_idx].is_none() {
                distances[next_idx] = next_dist;
                queue.push_back(next_idx);
            }
        }
    }

    distances
}
