//! PageRank algorithm implementation
//!
//! Used as a seed-scoring signal. When the view carries edge weights the
//! rank is pushed along arcs proportionally to weight, so heavily
//! co-occurring keywords pass more of their score.

use super::common::{GraphView, NodeId};
use std::collections::HashMap;

/// PageRank configuration
#[derive(Debug, Clone)]
pub struct PageRankConfig {
    /// Damping factor (usually 0.85)
    pub damping_factor: f64,
    /// Maximum number of iterations
    pub iterations: usize,
    /// Stop once the L1 change between iterations drops below this
    pub tolerance: f64,
    /// Use view weights when present
    pub weighted: bool,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.85,
            iterations: 20,
            tolerance: 0.0001,
            weighted: true,
        }
    }
}

/// Calculate PageRank for the graph view
pub fn page_rank(view: &GraphView, config: PageRankConfig) -> HashMap<NodeId, f64> {
    let n = view.node_count;

    if n == 0 {
        return HashMap::new();
    }

    let weighted = config.weighted && view.weights.is_some();

    // Outgoing weight totals, computed once
    let out_totals: Vec<f64> = (0..n)
        .map(|u| match (weighted, view.weights(u)) {
            (true, Some(w)) => w.iter().sum(),
            _ => view.out_degree(u) as f64,
        })
        .collect();

    let mut scores = vec![1.0; n];
    let mut next_scores = vec![0.0; n];

    let d = config.damping_factor;
    let base_score = 1.0 - d;

    for _ in 0..config.iterations {
        next_scores.iter_mut().for_each(|s| *s = 0.0);

        // Push each node's share to its successors
        for u in 0..n {
            let total = out_totals[u];
            if total <= 0.0 {
                continue;
            }
            let succ = view.successors(u);
            match (weighted, view.weights(u)) {
                (true, Some(w)) => {
                    for (&v, &wt) in succ.iter().zip(w) {
                        next_scores[v] += scores[u] * wt / total;
                    }
                }
                _ => {
                    for &v in succ {
                        next_scores[v] += scores[u] / total;
                    }
                }
            }
        }

        let mut total_diff = 0.0;
        for i in 0..n {
            next_scores[i] = base_score + d * next_scores[i];
            total_diff += (next_scores[i] - scores[i]).abs();
        }

        // Swap buffers
        std::mem::swap(&mut scores, &mut next_scores);

        if total_diff < config.tolerance {
            break;
        }
    }

    scores
        .into_iter()
        .enumerate()
        .map(|(idx, score)| (view.index_to_node[idx], score))
        .collect()
}
