//! Vertex implementation
//!
//! A vertex pairs a surrogate id with its label. Two vertices with the same
//! label denote the same keyword even when they were built independently
//! (for example in the graphs of two different years), so equality, hashing
//! and ordering look at the label only.

use super::types::{Label, VertexId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub label: Label,
}

impl Vertex {
    pub fn new(id: VertexId, label: impl Into<Label>) -> Self {
        Vertex {
            id,
            label: label.into(),
        }
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
    }
}

impl Eq for Vertex {}

impl Hash for Vertex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.label.hash(state);
    }
}

impl PartialOrd for Vertex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Vertex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.label.cmp(&other.label)
    }
}
