//! Directed infection probabilities
//!
//! Every undirected edge `{u, v}` with usage `num` yields two directed
//! probabilities, `num / W(v)` towards `v` and `num / W(u)` towards `u`.
//! The raw values are then rescaled to `min(1, k · p / max)`.

use super::{DiffusionError, DiffusionResult};
use crate::graph::{KeywordGraph, VertexId, VertexWeights};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

/// Directed probabilities, keyed by `(from, to)`.
///
/// Only pairs joined by an edge ever have an entry.
#[derive(Debug, Clone, Default)]
pub struct Probabilities {
    values: FxHashMap<(VertexId, VertexId), f64>,
}

impl Probabilities {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Probability that `from` infects `to`; 0 when the pair has no entry
    pub fn get(&self, from: VertexId, to: VertexId) -> f64 {
        self.values.get(&(from, to)).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, from: VertexId, to: VertexId) -> bool {
        self.values.contains_key(&(from, to))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VertexId, VertexId, f64)> + '_ {
        self.values.iter().map(|(&(from, to), &p)| (from, to, p))
    }
}

/// Derives [`Probabilities`] for one period's graph
#[derive(Debug, Clone, Copy)]
pub struct PropagationModel {
    intensity: f64,
}

impl PropagationModel {
    /// `intensity` is the factor `k`; it must be finite and non-negative
    pub fn new(intensity: f64) -> DiffusionResult<Self> {
        if !intensity.is_finite() || intensity < 0.0 {
            return Err(DiffusionError::InvalidIntensity(intensity));
        }
        Ok(PropagationModel { intensity })
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn derive(&self, graph: &KeywordGraph, weights: &VertexWeights) -> DiffusionResult<Probabilities> {
        let mut raw: FxHashMap<(VertexId, VertexId), f64> = FxHashMap::default();
        let mut degenerate = 0usize;

        for edge in graph.edges() {
            let num = edge.usage() as f64;
            let (u, v) = (edge.source, edge.target);

            let towards_v = ratio(num, weights.get(&v).copied());
            let towards_u = ratio(num, weights.get(&u).copied());
            degenerate += usize::from(towards_v.is_none()) + usize::from(towards_u.is_none());

            raw.insert((u, v), towards_v.unwrap_or(0.0));
            raw.insert((v, u), towards_u.unwrap_or(0.0));
        }

        if degenerate > 0 {
            warn!(degenerate, "vertices with missing or non-positive weight; their incoming probability is 0");
        }

        let max = raw.values().copied().fold(0.0_f64, f64::max);
        if raw.is_empty() || max <= 0.0 {
            debug!(edges = graph.edge_count(), "no positive probability, spread stops at the seeds");
            return Ok(Probabilities::empty());
        }

        let k = self.intensity;
        let mut values = FxHashMap::with_capacity_and_hasher(raw.len(), Default::default());
        for ((from, to), p) in raw {
            let mut scaled = k * p / max;
            if scaled > 1.0 {
                scaled = 1.0;
            }
            // NaN fails the range check too
            if !(0.0..=1.0).contains(&scaled) {
                return Err(DiffusionError::ProbabilityOutOfRange {
                    from,
                    to,
                    value: scaled,
                });
            }
            values.insert((from, to), scaled);
        }

        debug!(pairs = values.len(), max, k, "derived propagation probabilities");
        Ok(Probabilities { values })
    }
}

/// `num / w`, or `None` when `w` is unusable as a denominator
fn ratio(num: f64, w: Option<f64>) -> Option<f64> {
    match w {
        Some(w) if w.is_finite() && w > 0.0 => Some(num / w),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(usage: u64) -> (KeywordGraph, VertexId, VertexId) {
        let mut g = KeywordGraph::new();
        let a = g.add_vertex("A");
        let b = g.add_vertex("B");
        g.add_edge(a, b, "x", usage).unwrap();
        (g, a, b)
    }

    #[test]
    fn test_two_vertex_graph() {
        let (g, a, b) = pair(4);
        let w: VertexWeights = [(a, 4.0), (b, 4.0)].into_iter().collect();
        let p = PropagationModel::new(1.0).unwrap().derive(&g, &w).unwrap();

        assert_eq!(p.len(), 2);
        assert_eq!(p.get(a, b), 1.0);
        assert_eq!(p.get(b, a), 1.0);
    }

    #[test]
    fn test_asymmetric_and_clipped() {
        let (g, a, b) = pair(2);
        let w: VertexWeights = [(a, 1.0), (b, 4.0)].into_iter().collect();
        // raw: a->b = 0.5, b->a = 2.0; max = 2.0
        let p = PropagationModel::new(1.2).unwrap().derive(&g, &w).unwrap();
        assert!((p.get(a, b) - 0.3).abs() < 1e-12);
        assert_eq!(p.get(b, a), 1.0);
    }

    #[test]
    fn test_zero_intensity_collapses() {
        let (g, a, b) = pair(3);
        let w: VertexWeights = [(a, 1.0), (b, 2.0)].into_iter().collect();
        let p = PropagationModel::new(0.0).unwrap().derive(&g, &w).unwrap();
        assert!(p.iter().all(|(_, _, x)| x == 0.0));
    }

    #[test]
    fn test_degenerate_inputs() {
        let mut g = KeywordGraph::new();
        g.add_vertex("lonely");
        let p = PropagationModel::new(1.0).unwrap().derive(&g, &VertexWeights::new()).unwrap();
        assert!(p.is_empty());

        // all weights unusable: max is 0
        let (g, a, b) = pair(3);
        let w: VertexWeights = [(a, 0.0), (b, f64::NAN)].into_iter().collect();
        let p = PropagationModel::new(1.0).unwrap().derive(&g, &w).unwrap();
        assert!(p.is_empty());
        assert_eq!(p.get(a, b), 0.0);
    }

    #[test]
    fn test_missing_weight_zeroes_one_direction() {
        let (g, a, b) = pair(3);
        let w: VertexWeights = [(a, 3.0)].into_iter().collect();
        let p = PropagationModel::new(1.0).unwrap().derive(&g, &w).unwrap();
        assert_eq!(p.get(b, a), 1.0);
        assert!(p.contains(a, b));
        assert_eq!(p.get(a, b), 0.0);
    }

    #[test]
    fn test_invalid_intensity() {
        assert!(matches!(PropagationModel::new(-1.0), Err(DiffusionError::InvalidIntensity(_))));
        assert!(PropagationModel::new(f64::INFINITY).is_err());
    }
}
