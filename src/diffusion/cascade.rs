//! Independent Cascade simulation
//!
//! Each vertex moves through `Susceptible -> Infected -> Removed` at most
//! once. At every step the vertices that were infected when the step began
//! get one chance to infect each susceptible neighbour, then retire.

use super::propagation::Probabilities;
use super::{DiffusionError, DiffusionResult};
use crate::graph::{KeywordGraph, VertexId};
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Per-trial state of a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeState {
    Susceptible,
    Infected,
    Removed,
}

impl NodeState {
    /// Whether `self -> next` is a legal move
    pub fn can_become(self, next: NodeState) -> bool {
        matches!(
            (self, next),
            (NodeState::Susceptible, NodeState::Infected) | (NodeState::Infected, NodeState::Removed)
        )
    }
}

/// Infections performed during one step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CascadeStep {
    /// 1-based step number
    pub step: usize,
    /// Every vertex active at the start of the step, with whom it infected
    pub infections: IndexMap<VertexId, Vec<VertexId>>,
    /// Size of the cumulative infected set once this step finished
    pub cumulative: usize,
}

impl CascadeStep {
    pub fn new_infections(&self) -> usize {
        self.infections.values().map(Vec::len).sum()
    }
}

/// Outcome of one cascade trial
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trial {
    /// De-duplicated seeds, in input order
    pub seeds: Vec<VertexId>,
    pub steps: Vec<CascadeStep>,
    /// Every vertex ever infected, seeds first, then in infection order
    pub infected: Vec<VertexId>,
}

impl Trial {
    /// Cumulative infected set after `step` (0 = seeds only)
    pub fn infected_through(&self, step: usize) -> &[VertexId] {
        let len = match step {
            0 => self.seeds.len(),
            n => self
                .steps
                .get(n - 1)
                .map(|s| s.cumulative)
                .unwrap_or(self.infected.len()),
        };
        &self.infected[..len]
    }
}

/// Runs cascade trials over a read-only graph and probability snapshot
#[derive(Debug, Clone, Copy)]
pub struct CascadeSimulator<'a> {
    graph: &'a KeywordGraph,
    probabilities: &'a Probabilities,
}

impl<'a> CascadeSimulator<'a> {
    pub fn new(graph: &'a KeywordGraph, probabilities: &'a Probabilities) -> Self {
        CascadeSimulator { graph, probabilities }
    }

    /// Run one trial with an RNG seeded from `seed`
    pub fn run_seeded(&self, seeds: &[VertexId], seed: u64) -> DiffusionResult<Trial> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.run(seeds, &mut rng)
    }

    /// Run one trial drawing coins from `rng`
    pub fn run<R: Rng + ?Sized>(&self, seeds: &[VertexId], rng: &mut R) -> DiffusionResult<Trial> {
        let seeds = self.validate_seeds(seeds)?;
        let cap = self.graph.vertex_count();

        let mut states: FxHashMap<VertexId, NodeState> = self
            .graph
            .vertex_ids()
            .map(|v| (v, NodeState::Susceptible))
            .collect();

        // Step 0: seeds become infected, nothing is recorded
        for &s in &seeds {
            transition(&mut states, s, NodeState::Infected)?;
        }

        let mut infected = seeds.clone();
        let mut active = seeds.clone();
        let mut steps = Vec::new();
        let mut step = 0;

        while !active.is_empty() {
            step += 1;
            if step > cap {
                return Err(DiffusionError::StepCapExceeded { cap });
            }

            let mut infections = IndexMap::with_capacity(active.len());
            let mut next = Vec::new();

            for &v1 in &active {
                let mut caught = Vec::new();
                for &v2 in self.graph.neighbors(v1) {
                    if states.get(&v2) != Some(&NodeState::Susceptible) {
                        continue;
                    }
                    let p = self.probabilities.get(v1, v2);
                    let coin: f64 = rng.gen();
                    if p > 0.0 && coin <= p {
                        transition(&mut states, v2, NodeState::Infected)?;
                        caught.push(v2);
                        next.push(v2);
                    }
                }
                transition(&mut states, v1, NodeState::Removed)?;
                infections.insert(v1, caught);
            }

            infected.extend_from_slice(&next);
            debug!(step, active = active.len(), new = next.len(), "cascade step");
            steps.push(CascadeStep {
                step,
                infections,
                cumulative: infected.len(),
            });
            active = next;
        }

        Ok(Trial {
            seeds,
            steps,
            infected,
        })
    }

    fn validate_seeds(&self, seeds: &[VertexId]) -> DiffusionResult<Vec<VertexId>> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::with_capacity(seeds.len());
        for &s in seeds {
            if !self.graph.contains(s) {
                return Err(DiffusionError::UnknownSeed(s));
            }
            if seen.insert(s) {
                out.push(s);
            }
        }
        Ok(out)
    }
}

fn transition(states: &mut FxHashMap<VertexId, NodeState>, vertex: VertexId, to: NodeState) -> DiffusionResult<()> {
    let from = states.get(&vertex).copied().unwrap_or(NodeState::Susceptible);
    if !from.can_become(to) {
        return Err(DiffusionError::IllegalTransition { vertex, from, to });
    }
    states.insert(vertex, to);
    Ok(())
}
