//! Topicflow
//!
//! Topic discovery and topic evolution over per-period keyword co-occurrence
//! graphs. Seed keywords start stochastic Independent Cascade trials; the
//! reachability of each seed is reconstructed, denoised across many trials
//! and merged into consensus topics, which are then linked period to period
//! into lineages.
//!
//! # Pipeline
//!
//! ```text
//! KeywordGraph + W(v) ──► PropagationModel ──► CascadeSimulator (× N trials)
//!                                                   │
//!                               unify ◄─────────────┘
//!                                 │
//!                        ConsensusMerger ──► ConsensusTopic per period
//!                                                   │
//!                                TopicTracer ◄──────┘ (per cohort)
//! ```
//!
//! # Requirements Implemented
//!
//! ## Graph model
//!
//! - ✅ REQ-GRAPH-001: Label-identified vertices with surrogate ids
//! - ✅ REQ-GRAPH-002: Undirected edges with contributor usage counts
//! - ✅ REQ-GRAPH-003: Shareable id sequences
//! - ✅ REQ-GRAPH-004: Vertex weight signals
//!
//! ## Diffusion
//!
//! - ✅ REQ-DIFF-001: Directed infection probabilities
//! - ✅ REQ-DIFF-002: Independent Cascade with a hard step cap
//! - ✅ REQ-DIFF-003: Per-seed reachability reconstruction
//!
//! ## Consensus and lineage
//!
//! - ✅ REQ-CONS-001: Frequency-based denoising
//! - ✅ REQ-CONS-002: Seed clustering by overlap
//! - ✅ REQ-LIN-001: Cohort bucketing
//! - ✅ REQ-LIN-002: Greedy lineage tracing
//!
//! ## Example Usage
//!
//! ```rust
//! use topicflow::graph::{KeywordGraph, Weighting};
//! use topicflow::diffusion::PropagationModel;
//! use topicflow::consensus::ConsensusMerger;
//!
//! let mut graph = KeywordGraph::new();
//! let a = graph.add_vertex("A");
//! let b = graph.add_vertex("B");
//! graph.add_edge(a, b, "alice", 1).unwrap();
//!
//! let weights = Weighting::IncidentUsage.compute(&graph);
//! let probabilities = PropagationModel::new(1.0).unwrap().derive(&graph, &weights).unwrap();
//!
//! let merger = ConsensusMerger::new(4, 0.5, 0.5).unwrap().with_rng_seed(Some(7));
//! let topics = merger.run(&graph, &probabilities, &[a]).unwrap();
//!
//! assert_eq!(topics.len(), 1);
//! assert_eq!(topics[0].member_labels(), vec!["B"]);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod config;
pub mod consensus;
pub mod diffusion;
pub mod graph;
pub mod lineage;
pub mod pipeline;
pub mod records;
pub mod scoring;

// Re-export main types for convenience
pub use graph::{
    EdgeId, GraphError, GraphResult, IdSequence, KeywordEdge, KeywordGraph, Label, Vertex, VertexId,
    VertexWeights, Weighting,
};

pub use diffusion::{
    unify, CascadeSimulator, CascadeStep, DiffusionError, DiffusionResult, NodeState, Probabilities,
    PropagationModel, SeedDescendants, Trial,
};

pub use consensus::{ConsensusError, ConsensusMerger, ConsensusResult, ConsensusTopic, SeedGroup};

pub use lineage::{CohortBuckets, LineageError, TopicIndex, TopicLineage, TopicTracer};

pub use scoring::{select_seeds, Blend, ScoringMeasure};

pub use config::{ConfigError, TopicflowConfig};

pub use records::{RecordError, RecordResult, SCHEMA_VERSION};

pub use pipeline::{
    run_periods, run_periods_with, ErrorKind, PeriodFailure, PeriodJob, PeriodOutcome, PeriodRunner, PipelineError, PipelineReport,
    PipelineResult,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
