//! Information diffusion over a keyword graph
//!
//! Implements:
//! - REQ-DIFF-001: Directed infection probabilities derived from edge usage
//! - REQ-DIFF-002: Independent Cascade trials with a hard step cap
//! - REQ-DIFF-003: Per-seed reachability reconstruction from step records

pub mod cascade;
pub mod propagation;
pub mod unify;

pub use cascade::{CascadeSimulator, CascadeStep, NodeState, Trial};
pub use propagation::{PropagationModel, Probabilities};
pub use unify::{unify, SeedDescendants};

use crate::graph::VertexId;
use thiserror::Error;

/// Errors raised by the diffusion stages
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiffusionError {
    #[error("Seed {0} is not a vertex of the graph")]
    UnknownSeed(VertexId),

    #[error("Intensity factor must be finite and >= 0, got {0}")]
    InvalidIntensity(f64),

    #[error("Probability {value} for {from} -> {to} is outside [0, 1]")]
    ProbabilityOutOfRange {
        from: VertexId,
        to: VertexId,
        value: f64,
    },

    #[error("Cascade exceeded the step cap of {cap} steps")]
    StepCapExceeded { cap: usize },

    #[error("Illegal state transition for {vertex}: {from:?} -> {to:?}")]
    IllegalTransition {
        vertex: VertexId,
        from: NodeState,
        to: NodeState,
    },

    #[error("Step {step}: infector {vertex} is not owned by any seed")]
    OrphanInfector { step: usize, vertex: VertexId },

    #[error("Step {step}: {vertex} was already infected")]
    DuplicateInfection { step: usize, vertex: VertexId },
}

impl DiffusionError {
    /// Bad input supplied by a caller, as opposed to a broken invariant
    pub fn is_bad_input(&self) -> bool {
        matches!(
            self,
            DiffusionError::UnknownSeed(_) | DiffusionError::InvalidIntensity(_)
        )
    }
}

pub type DiffusionResult<T> = Result<T, DiffusionError>;
