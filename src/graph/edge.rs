//! Undirected co-occurrence edges
//!
//! An edge records which contributors (authors) used its keyword pair and
//! how often. Its aggregate weight is the total usage over all contributors.

use super::types::{EdgeId, VertexId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordEdge {
    pub id: EdgeId,

    /// Endpoint with the smaller id
    pub source: VertexId,

    /// Endpoint with the larger id
    pub target: VertexId,

    /// contributor -> usage count
    pub contributors: BTreeMap<String, u64>,
}

impl KeywordEdge {
    pub fn new(id: EdgeId, a: VertexId, b: VertexId) -> Self {
        let (source, target) = ordered_pair(a, b);
        KeywordEdge {
            id,
            source,
            target,
            contributors: BTreeMap::new(),
        }
    }

    /// Sum of all contributor usage counts
    pub fn usage(&self) -> u64 {
        self.contributors.values().sum()
    }

    pub fn add_usage(&mut self, contributor: impl Into<String>, count: u64) {
        *self.contributors.entry(contributor.into()).or_insert(0) += count;
    }

    pub fn merge_contributors(&mut self, other: &BTreeMap<String, u64>) {
        for (contributor, count) in other {
            self.add_usage(contributor.clone(), *count);
        }
    }

    /// The endpoint opposite to `v`, if `v` is one of the endpoints
    pub fn other(&self, v: VertexId) -> Option<VertexId> {
        if v == self.source {
            Some(self.target)
        } else if v == self.target {
            Some(self.source)
        } else {
            None
        }
    }
}

/// Outcome of inserting an edge into a [`KeywordGraph`](super::KeywordGraph)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeInsert {
    Created(EdgeId),
    /// The pair already had an edge; contributor counts were added to it
    Merged(EdgeId),
    /// Both endpoints were the same vertex
    SkippedSelfLoop,
}

impl EdgeInsert {
    pub fn edge_id(&self) -> Option<EdgeId> {
        match self {
            EdgeInsert::Created(id) | EdgeInsert::Merged(id) => Some(*id),
            EdgeInsert::SkippedSelfLoop => None,
        }
    }
}

pub(crate) fn ordered_pair(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
