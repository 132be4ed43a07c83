//! Consensus topics
//!
//! Implements:
//! - REQ-CONS-001: Frequency-based denoising of per-seed descendant sets
//! - REQ-CONS-002: Seed clustering by overlap coefficient and connected components
//! - REQ-CONS-003: Vertex to topic membership for rendering collaborators

pub mod merger;
pub mod similarity;

pub use merger::{ConsensusMerger, SeedConsensus};
pub use similarity::overlap_coefficient;

use crate::diffusion::DiffusionError;
use crate::graph::{GraphError, KeywordGraph, Vertex, VertexId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsensusError {
    #[error("Trial {trial} failed: {source}")]
    Trial { trial: usize, source: DiffusionError },

    #[error("Invalid consensus parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type ConsensusResult<T> = Result<T, ConsensusError>;

/// Seeds grouped in phase 2, before labels are resolved
#[derive(Debug, Clone, PartialEq)]
pub struct SeedGroup {
    /// In input order
    pub seeds: Vec<VertexId>,
    pub members: BTreeSet<VertexId>,
}

impl SeedGroup {
    pub fn resolve(&self, graph: &KeywordGraph) -> ConsensusResult<ConsensusTopic> {
        Ok(ConsensusTopic {
            seeds: resolve_all(graph, &self.seeds)?,
            members: resolve_all(graph, &self.members)?,
        })
    }
}

fn resolve_all<'a>(
    graph: &KeywordGraph,
    ids: impl IntoIterator<Item = &'a VertexId>,
) -> ConsensusResult<BTreeSet<Vertex>> {
    ids.into_iter()
        .map(|&id| graph.require(id).cloned().map_err(ConsensusError::from))
        .collect()
}

/// One merged topic of a period. Both sets are ordered by label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusTopic {
    pub seeds: BTreeSet<Vertex>,
    pub members: BTreeSet<Vertex>,
}

impl ConsensusTopic {
    pub fn new(seeds: impl IntoIterator<Item = Vertex>, members: impl IntoIterator<Item = Vertex>) -> Self {
        ConsensusTopic {
            seeds: seeds.into_iter().collect(),
            members: members.into_iter().collect(),
        }
    }

    pub fn seed_labels(&self) -> Vec<&str> {
        self.seeds.iter().map(|v| v.label.as_str()).collect()
    }

    pub fn member_labels(&self) -> Vec<&str> {
        self.members.iter().map(|v| v.label.as_str()).collect()
    }
}

/// Vertex -> topic index, for colouring. Seeds and members are both mapped;
/// when a vertex belongs to several topics the first one wins.
pub fn topic_membership(topics: &[ConsensusTopic]) -> IndexMap<Vertex, usize> {
    let mut groups = IndexMap::new();
    for (idx, topic) in topics.iter().enumerate() {
        for vertex in topic.seeds.iter().chain(&topic.members) {
            groups.entry(vertex.clone()).or_insert(idx);
        }
    }
    groups
}
