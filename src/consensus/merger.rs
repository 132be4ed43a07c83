//! Ensemble consensus over many cascade trials
//!
//! Phase 1 keeps, per seed, the vertices that show up in at least a fraction
//! `r` of the trials. Phase 2 joins seeds whose phase-1 sets overlap by more
//! than `t` and groups them into topics by connected components.

use super::similarity::overlap_coefficient;
use super::{ConsensusError, ConsensusResult, ConsensusTopic, SeedGroup};
use crate::config::ConsensusConfig;
use crate::diffusion::{unify, CascadeSimulator, Probabilities, SeedDescendants, Trial};
use crate::graph::{KeywordGraph, VertexId};
use indexmap::IndexMap;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use topicflow_graph_algorithms::{weakly_connected_components, GraphView};
use tracing::{debug, info};

/// Per-seed consensus sets, in seed order
pub type SeedConsensus = IndexMap<VertexId, BTreeSet<VertexId>>;

#[derive(Debug, Clone)]
pub struct ConsensusMerger {
    trials: usize,
    frequency_ratio: f64,
    merge_threshold: f64,
    rng_seed: Option<u64>,
    parallel: bool,
}

impl ConsensusMerger {
    /// `trials >= 1`, `frequency_ratio` and `merge_threshold` in `(0, 1]`
    pub fn new(trials: usize, frequency_ratio: f64, merge_threshold: f64) -> ConsensusResult<Self> {
        if trials == 0 {
            return Err(ConsensusError::InvalidParameter("trials must be at least 1".into()));
        }
        if !(frequency_ratio > 0.0 && frequency_ratio <= 1.0) {
            return Err(ConsensusError::InvalidParameter(format!(
                "frequency ratio must be in (0, 1], got {frequency_ratio}"
            )));
        }
        if !(merge_threshold > 0.0 && merge_threshold <= 1.0) {
            return Err(ConsensusError::InvalidParameter(format!(
                "merge threshold must be in (0, 1], got {merge_threshold}"
            )));
        }
        Ok(ConsensusMerger {
            trials,
            frequency_ratio,
            merge_threshold,
            rng_seed: None,
            parallel: true,
        })
    }

    pub fn from_config(config: &ConsensusConfig) -> ConsensusResult<Self> {
        let merger = Self::new(config.trials, config.frequency_ratio, config.merge_threshold)?;
        Ok(merger.with_rng_seed(config.rng_seed).with_parallel(config.parallel))
    }

    /// Trial `i` uses `StdRng::seed_from_u64(seed + i)`; `None` means entropy
    pub fn with_rng_seed(mut self, seed: Option<u64>) -> Self {
        self.rng_seed = seed;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Run every trial, then both phases, and resolve topics against `graph`
    pub fn run(
        &self,
        graph: &KeywordGraph,
        probabilities: &Probabilities,
        seeds: &[VertexId],
    ) -> ConsensusResult<Vec<ConsensusTopic>> {
        let trials = self.simulate(graph, probabilities, seeds)?;
        self.consolidate(graph, seeds, &trials)
    }

    /// Run all trials.
    ///
    /// Nothing is returned until every trial has finished; the first failed
    /// trial fails the whole batch.
    pub fn simulate(
        &self,
        graph: &KeywordGraph,
        probabilities: &Probabilities,
        seeds: &[VertexId],
    ) -> ConsensusResult<Vec<Trial>> {
        info!(
            trials = self.trials,
            seeds = seeds.len(),
            vertices = graph.vertex_count(),
            "running cascade trials"
        );
        let sim = CascadeSimulator::new(graph, probabilities);

        let one = |trial: usize| -> ConsensusResult<Trial> {
            let outcome = match self.rng_seed {
                Some(base) => sim.run_seeded(seeds, base.wrapping_add(trial as u64)),
                None => sim.run(seeds, &mut rand::thread_rng()),
            };
            let outcome = outcome.map_err(|source| ConsensusError::Trial { trial, source })?;
            debug!(trial, steps = outcome.steps.len(), infected = outcome.infected.len(), "trial finished");
            Ok(outcome)
        };

        if self.parallel {
            (0..self.trials).into_par_iter().map(one).collect()
        } else {
            (0..self.trials).map(one).collect()
        }
    }

    /// Unify finished trials, then run both phases
    pub fn consolidate(
        &self,
        graph: &KeywordGraph,
        seeds: &[VertexId],
        trials: &[Trial],
    ) -> ConsensusResult<Vec<ConsensusTopic>> {
        let descendants = trials
            .iter()
            .enumerate()
            .map(|(trial, t)| unify(&t.seeds, &t.steps).map_err(|source| ConsensusError::Trial { trial, source }))
            .collect::<ConsensusResult<Vec<SeedDescendants>>>()?;

        let consensus = self.phase_one(seeds, &descendants);
        let groups = self.phase_two(&consensus);
        debug!(seeds = consensus.len(), topics = groups.len(), "seed groups formed");

        groups.iter().map(|g| g.resolve(graph)).collect()
    }

    /// Frequency filter: keep a vertex for a seed iff it appears in that
    /// seed's set in at least `r · N` trials.
    ///
    /// A trial where the seed infected nobody still counts towards `N`.
    pub fn phase_one(&self, seeds: &[VertexId], trials: &[SeedDescendants]) -> SeedConsensus {
        let required = self.frequency_ratio * trials.len() as f64;
        let mut consensus = SeedConsensus::with_capacity(seeds.len());

        for &seed in seeds {
            if consensus.contains_key(&seed) {
                continue;
            }
            let mut tally: FxHashMap<VertexId, usize> = FxHashMap::default();
            for trial in trials {
                if let Some(set) = trial.get(&seed) {
                    for &v in set {
                        *tally.entry(v).or_insert(0) += 1;
                    }
                }
            }
            let kept: BTreeSet<VertexId> = tally
                .into_iter()
                .filter(|&(_, count)| count as f64 >= required)
                .map(|(v, _)| v)
                .collect();
            consensus.insert(seed, kept);
        }

        consensus
    }

    /// Group seeds whose consensus sets overlap by more than the merge
    /// threshold, transitively. Groups come out ordered by their earliest seed.
    pub fn phase_two(&self, consensus: &SeedConsensus) -> Vec<SeedGroup> {
        let seeds: Vec<(&VertexId, &BTreeSet<VertexId>)> = consensus.iter().collect();
        let mut pairs = Vec::new();

        for (i, (a, set_a)) in seeds.iter().enumerate() {
            for (b, set_b) in &seeds[i + 1..] {
                let sim = overlap_coefficient(set_a, set_b);
                if sim > self.merge_threshold {
                    debug!(a = a.as_u64(), b = b.as_u64(), sim, "seeds overlap");
                    pairs.push((a.as_u64(), b.as_u64(), sim));
                }
            }
        }

        let nodes: Vec<u64> = seeds.iter().map(|(s, _)| s.as_u64()).collect();
        let view = GraphView::undirected(&nodes, &pairs);
        let components = weakly_connected_components(&view);

        components
            .components
            .into_iter()
            .map(|component| {
                let seeds: Vec<VertexId> = component.into_iter().map(VertexId::new).collect();
                let members = seeds
                    .iter()
                    .filter_map(|s| consensus.get(s))
                    .flat_map(|set| set.iter().copied())
                    .collect();
                SeedGroup { seeds, members }
            })
            .collect()
    }
}
