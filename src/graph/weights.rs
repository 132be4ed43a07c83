//! Per-vertex weight signals
//!
//! These produce the `W(v)` denominators consumed by the propagation model
//! and the optional weight blended into seed scores.

use super::store::KeywordGraph;
use super::types::VertexId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type VertexWeights = HashMap<VertexId, f64>;

/// How `W(v)` is derived when no explicit weights are supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// Total usage of the incident edges
    #[default]
    IncidentUsage,
    /// Incident usage, log-normalized by the maximum.
    ///
    /// Vertices with total usage at or below 1 get `W(v) = 0` and cannot be
    /// infected.
    LogIncidentUsage,
}

impl Weighting {
    pub fn compute(&self, graph: &KeywordGraph) -> VertexWeights {
        match self {
            Weighting::IncidentUsage => incident_usage(graph),
            Weighting::LogIncidentUsage => log_normalized(&incident_usage(graph)),
        }
    }
}

/// `W(v) = Σ usage(e)` over the edges incident to `v`
pub fn incident_usage(graph: &KeywordGraph) -> VertexWeights {
    graph
        .vertex_ids()
        .map(|v| {
            let total: u64 = graph
                .neighbors(v)
                .iter()
                .filter_map(|&n| graph.edge_between(v, n))
                .map(|e| e.usage())
                .sum();
            (v, total as f64)
        })
        .collect()
}

/// `ln(W(v)) / ln(max W)`.
///
/// Values at or below 1 have no positive logarithm and map to 0, as does
/// everything when the maximum itself is at or below 1.
pub fn log_normalized(scores: &VertexWeights) -> VertexWeights {
    let max = scores.values().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(max > 1.0) || !max.is_finite() {
        return scores.keys().map(|&v| (v, 0.0)).collect();
    }
    let denom = max.ln();
    scores
        .iter()
        .map(|(&v, &w)| {
            let value = if w > 1.0 { w.ln() / denom } else { 0.0 };
            (v, value)
        })
        .collect()
}

/// Sum, over incident edges, of the scores of each edge's contributors.
///
/// Contributors without a score count as 0.
pub fn contributor_weighted(graph: &KeywordGraph, contributor_scores: &HashMap<String, f64>) -> VertexWeights {
    graph
        .vertex_ids()
        .map(|v| {
            let total: f64 = graph
                .neighbors(v)
                .iter()
                .filter_map(|&n| graph.edge_between(v, n))
                .flat_map(|e| e.contributors.keys())
                .filter_map(|c| contributor_scores.get(c))
                .sum();
            (v, total)
        })
        .collect()
}

/// `wa · a(v) + wb · b(v)`; a vertex missing from one side counts 0 there
pub fn compose(a: &VertexWeights, b: &VertexWeights, wa: f64, wb: f64) -> VertexWeights {
    let mut out: VertexWeights = a.iter().map(|(&v, &x)| (v, wa * x)).collect();
    for (&v, &y) in b {
        *out.entry(v).or_insert(0.0) += wb * y;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (KeywordGraph, VertexId, VertexId, VertexId) {
        let mut g = KeywordGraph::new();
        let a = g.add_vertex("a");
        let b = g.add_vertex("b");
        let c = g.add_vertex("c");
        g.add_edge(a, b, "x", 4).unwrap();
        g.add_edge(a, c, "y", 2).unwrap();
        g.add_edge(a, c, "x", 2).unwrap();
        (g, a, b, c)
    }

    #[test]
    fn test_incident_usage() {
        let (g, a, b, c) = triangle();
        let w = incident_usage(&g);
        assert_eq!(w[&a], 8.0);
        assert_eq!(w[&b], 4.0);
        assert_eq!(w[&c], 4.0);
    }

    #[test]
    fn test_log_normalized() {
        let (g, a, b, _) = triangle();
        let w = log_normalized(&incident_usage(&g));
        assert!((w[&a] - 1.0).abs() < 1e-12);
        assert!((w[&b] - 4f64.ln() / 8f64.ln()).abs() < 1e-12);

        let flat: VertexWeights = [(a, 1.0), (b, 0.0)].into_iter().collect();
        assert!(log_normalized(&flat).values().all(|&x| x == 0.0));
    }

    #[test]
    fn test_contributor_weighted() {
        let (g, a, b, c) = triangle();
        let scores: HashMap<String, f64> = [("x".to_string(), 0.5), ("y".to_string(), 0.25)].into_iter().collect();
        let w = contributor_weighted(&g, &scores);
        // a: edge ab {x} + edge ac {x, y}
        assert!((w[&a] - 1.25).abs() < 1e-12);
        assert!((w[&b] - 0.5).abs() < 1e-12);
        assert!((w[&c] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_compose() {
        let a: VertexWeights = [(VertexId(1), 1.0), (VertexId(2), 2.0)].into_iter().collect();
        let b: VertexWeights = [(VertexId(2), 10.0), (VertexId(3), 4.0)].into_iter().collect();
        let w = compose(&a, &b, 0.5, 0.1);
        assert_eq!(w[&VertexId(1)], 0.5);
        assert_eq!(w[&VertexId(2)], 2.0);
        assert!((w[&VertexId(3)] - 0.4).abs() < 1e-12);
    }
}
