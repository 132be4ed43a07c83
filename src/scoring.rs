//! Seed selection
//!
//! Seeds are the top-`k` vertices under a centrality measure, optionally
//! blended with a per-vertex weight. Centralities come from the algorithms
//! crate; they are normalized by their maximum before blending.

use crate::algo::{
    build_view, degree_centrality, harmonic_closeness, local_clustering_coefficient, page_rank,
    to_vertex_scores, PageRankConfig,
};
use crate::graph::{KeywordGraph, VertexId, VertexWeights};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("Unknown scoring measure '{0}' (expected one of pag, clu, clo, deg)")]
    UnknownMeasure(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMeasure {
    PageRank,
    ClusteringCoefficient,
    HarmonicCloseness,
    Degree,
}

/// Canonical short names, used as keys in output file names
const SHORT_NAMES: [(ScoringMeasure, &str); 4] = [
    (ScoringMeasure::PageRank, "pag"),
    (ScoringMeasure::ClusteringCoefficient, "clu"),
    (ScoringMeasure::HarmonicCloseness, "clo"),
    (ScoringMeasure::Degree, "deg"),
];

impl ScoringMeasure {
    pub const ALL: [ScoringMeasure; 4] = [
        ScoringMeasure::PageRank,
        ScoringMeasure::ClusteringCoefficient,
        ScoringMeasure::HarmonicCloseness,
        ScoringMeasure::Degree,
    ];

    pub fn short_name(&self) -> &'static str {
        SHORT_NAMES
            .iter()
            .find(|(m, _)| m == self)
            .map(|(_, name)| *name)
            .unwrap_or("unknown")
    }

    pub fn from_short_name(name: &str) -> Option<Self> {
        SHORT_NAMES
            .iter()
            .find(|(_, short)| short.eq_ignore_ascii_case(name))
            .map(|(m, _)| *m)
    }
}

impl fmt::Display for ScoringMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for ScoringMeasure {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_short_name(s).ok_or_else(|| ScoringError::UnknownMeasure(s.to_string()))
    }
}

/// How a weight map is combined with normalized scores
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Blend {
    /// Scores only
    #[default]
    None,
    /// `a · score + b · weight`
    Linear { a: f64, b: f64 },
    /// `score · weight`
    Product,
}

impl Blend {
    fn apply(&self, score: f64, weight: f64) -> f64 {
        match self {
            Blend::None => score,
            Blend::Linear { a, b } => a * score + b * weight,
            Blend::Product => score * weight,
        }
    }
}

/// Centrality of every vertex under `measure`, divided by the maximum
pub fn score(graph: &KeywordGraph, measure: ScoringMeasure) -> VertexWeights {
    let view = build_view(graph);
    let raw = match measure {
        ScoringMeasure::PageRank => page_rank(&view, PageRankConfig::default()),
        ScoringMeasure::ClusteringCoefficient => local_clustering_coefficient(&view),
        ScoringMeasure::HarmonicCloseness => harmonic_closeness(&view),
        ScoringMeasure::Degree => degree_centrality(&view),
    };
    normalize_by_max(to_vertex_scores(raw))
}

fn normalize_by_max(scores: VertexWeights) -> VertexWeights {
    let max = scores.values().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return scores.into_keys().map(|v| (v, 0.0)).collect();
    }
    scores.into_iter().map(|(v, s)| (v, s / max)).collect()
}

/// Normalized scores blended with `weights`; missing weights count as 0
pub fn blended(
    graph: &KeywordGraph,
    measure: ScoringMeasure,
    weights: Option<&VertexWeights>,
    blend: Blend,
) -> VertexWeights {
    let scores = score(graph, measure);
    if blend == Blend::None {
        return scores;
    }
    scores
        .into_iter()
        .map(|(v, s)| {
            let w = weights.and_then(|w| w.get(&v)).copied().unwrap_or(0.0);
            (v, blend.apply(s, w))
        })
        .collect()
}

/// The top `min(k, |V|)` vertices by blended score; ties go to the smaller label
pub fn select_seeds(
    graph: &KeywordGraph,
    measure: ScoringMeasure,
    weights: Option<&VertexWeights>,
    blend: Blend,
    k: usize,
) -> Vec<VertexId> {
    let scores = blended(graph, measure, weights, blend);
    let mut ranked: Vec<(VertexId, f64, &str)> = graph
        .vertices()
        .map(|v| (v.id, scores.get(&v.id).copied().unwrap_or(0.0), v.label.as_str()))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.2.cmp(b.2)));
    ranked.truncate(k);

    debug!(measure = %measure, k, selected = ranked.len(), "selected seeds");
    ranked.into_iter().map(|(v, _, _)| v).collect()
}
