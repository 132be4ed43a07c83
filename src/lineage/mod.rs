//! Topic lineages across periods
//!
//! Implements:
//! - REQ-LIN-001: Cohort bucketing of uneven seed counts
//! - REQ-LIN-002: Greedy best-overlap tracing with single use of each topic

pub mod cohort;
pub mod tracer;

pub use cohort::CohortBuckets;
pub use tracer::{LineageLink, TopicLineage, TopicTracer};

use crate::consensus::ConsensusTopic;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LineageError {
    #[error("At least one cohort target is required")]
    NoCohortTargets,
}

pub type LineageResult<T> = Result<T, LineageError>;

/// period -> topics of that period
pub type CohortTopics = BTreeMap<i32, Vec<ConsensusTopic>>;

/// Consensus topics keyed by cohort, then period
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicIndex {
    cohorts: BTreeMap<usize, CohortTopics>,
}

impl TopicIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append topics; repeated `(cohort, period)` keys accumulate
    pub fn insert(&mut self, cohort: usize, period: i32, topics: Vec<ConsensusTopic>) {
        self.cohorts
            .entry(cohort)
            .or_default()
            .entry(period)
            .or_default()
            .extend(topics);
    }

    pub fn cohort(&self, cohort: usize) -> Option<&CohortTopics> {
        self.cohorts.get(&cohort)
    }

    pub fn get(&self, cohort: usize, period: i32) -> Option<&[ConsensusTopic]> {
        self.cohorts
            .get(&cohort)
            .and_then(|p| p.get(&period))
            .map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &CohortTopics)> {
        self.cohorts.iter().map(|(&c, p)| (c, p))
    }

    pub fn cohort_count(&self) -> usize {
        self.cohorts.len()
    }

    pub fn topic_count(&self) -> usize {
        self.cohorts.values().flat_map(|p| p.values()).map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.topic_count() == 0
    }
}
