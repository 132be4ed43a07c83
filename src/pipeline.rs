//! Period pipeline
//!
//! Composes the stages for one period: weights, probabilities, trials,
//! unification and consensus. Periods are independent: a period that fails
//! is reported with its reason and the others carry on.

use crate::config::{ConfigError, TopicflowConfig};
use crate::consensus::{ConsensusError, ConsensusMerger, ConsensusTopic};
use crate::diffusion::{DiffusionError, PropagationModel, Trial};
use crate::graph::{GraphError, KeywordGraph, VertexId, VertexWeights, Weighting};
use crate::lineage::{CohortBuckets, TopicIndex, TopicLineage, TopicTracer};
use crate::records::RecordError;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::{error, info};

/// Broad class of a pipeline failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed or inconsistent input; fixing the input fixes the run
    BadInput,
    /// An internal integrity check failed
    InvariantViolated,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::BadInput => f.write_str("bad input"),
            ErrorKind::InvariantViolated => f.write_str("invariant violated"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Diffusion(#[from] DiffusionError),

    #[error(transparent)]
    Consensus(#[from] ConsensusError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Diffusion(e) => diffusion_kind(e),
            PipelineError::Consensus(ConsensusError::Trial { source, .. }) => diffusion_kind(source),
            PipelineError::Consensus(ConsensusError::InvalidParameter(_)) => ErrorKind::BadInput,
            // topics only reference vertices the trials produced
            PipelineError::Consensus(ConsensusError::Graph(_)) => ErrorKind::InvariantViolated,
            PipelineError::Graph(_) | PipelineError::Record(_) | PipelineError::Config(_) => ErrorKind::BadInput,
        }
    }
}

fn diffusion_kind(e: &DiffusionError) -> ErrorKind {
    if e.is_bad_input() {
        ErrorKind::BadInput
    } else {
        ErrorKind::InvariantViolated
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Everything produced for one period
#[derive(Debug, Clone)]
pub struct PeriodOutcome {
    pub topics: Vec<ConsensusTopic>,
    pub trials: Vec<Trial>,
    /// Number of directed probabilities derived
    pub probabilities: usize,
}

/// Runs the stages for a single `(graph, seeds)` input
#[derive(Debug, Clone)]
pub struct PeriodRunner {
    model: PropagationModel,
    weighting: Weighting,
    merger: ConsensusMerger,
}

impl PeriodRunner {
    pub fn new(model: PropagationModel, weighting: Weighting, merger: ConsensusMerger) -> Self {
        PeriodRunner {
            model,
            weighting,
            merger,
        }
    }

    pub fn from_config(config: &TopicflowConfig) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self::new(
            PropagationModel::new(config.propagation.intensity)?,
            config.propagation.weighting,
            ConsensusMerger::from_config(&config.consensus)?,
        ))
    }

    /// Consensus topics for one period.
    ///
    /// `weights` overrides the configured weighting when present.
    pub fn run(
        &self,
        graph: &KeywordGraph,
        weights: Option<&VertexWeights>,
        seeds: &[VertexId],
    ) -> PipelineResult<Vec<ConsensusTopic>> {
        Ok(self.run_detailed(graph, weights, seeds)?.topics)
    }

    /// Like [`run`](Self::run), also returning the raw trials
    pub fn run_detailed(
        &self,
        graph: &KeywordGraph,
        weights: Option<&VertexWeights>,
        seeds: &[VertexId],
    ) -> PipelineResult<PeriodOutcome> {
        if let Some(&missing) = seeds.iter().find(|s| !graph.contains(**s)) {
            return Err(DiffusionError::UnknownSeed(missing).into());
        }

        let computed;
        let weights = match weights {
            Some(w) => w,
            None => {
                computed = self.weighting.compute(graph);
                &computed
            }
        };

        let probabilities = self.model.derive(graph, weights)?;
        let trials = self.merger.simulate(graph, &probabilities, seeds)?;
        let topics = self.merger.consolidate(graph, seeds, &trials)?;

        Ok(PeriodOutcome {
            topics,
            trials,
            probabilities: probabilities.len(),
        })
    }
}

/// One unit of work for [`run_periods`]
#[derive(Debug, Clone)]
pub struct PeriodJob<'a> {
    pub period: i32,
    pub graph: &'a KeywordGraph,
    pub weights: Option<&'a VertexWeights>,
    pub seeds: Vec<VertexId>,
    /// Requested cohort (the `k` a seed list was selected for). Ties in
    /// snapping follow the bucket this series got in its previous period.
    pub series: Option<usize>,
}

impl PeriodJob<'_> {
    /// Number of distinct seeds
    pub fn seed_count(&self) -> usize {
        self.seeds.iter().collect::<FxHashSet<_>>().len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub period: i32,
    pub cohort: usize,
    pub seeds: usize,
    pub topics: usize,
    pub members: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodFailure {
    pub period: i32,
    pub cohort: usize,
    pub kind: ErrorKind,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub index: TopicIndex,
    pub summaries: Vec<PeriodSummary>,
    pub failures: Vec<PeriodFailure>,
}

impl PipelineReport {
    /// Trace lineages over every successful period
    pub fn trace(&self, tracer: &TopicTracer) -> Vec<TopicLineage<'_>> {
        tracer.trace(&self.index)
    }
}

/// Run every job, periods in ascending order.
///
/// Each job's distinct seed count is snapped to a cohort; on a tie the bucket
/// its series got in the previous period wins. Jobs without a series are
/// grouped by their seed count.
pub fn run_periods(runner: &PeriodRunner, buckets: &CohortBuckets, jobs: Vec<PeriodJob<'_>>) -> PipelineReport {
    run_periods_with(runner, buckets, jobs, |_, _, _| {})
}

/// Like [`run_periods`], handing every successful outcome to `observe`
/// together with its job and cohort before the topics are indexed.
pub fn run_periods_with<F>(
    runner: &PeriodRunner,
    buckets: &CohortBuckets,
    mut jobs: Vec<PeriodJob<'_>>,
    mut observe: F,
) -> PipelineReport
where
    F: FnMut(&PeriodJob<'_>, usize, &PeriodOutcome),
{
    jobs.sort_by_key(|j| (j.period, j.series, j.seed_count()));

    let mut report = PipelineReport::default();
    let mut previous: HashMap<usize, usize> = HashMap::new();

    for job in &jobs {
        let count = job.seed_count();
        let series = job.series.unwrap_or(count);
        let cohort = buckets.snap(count, previous.get(&series).copied());
        previous.insert(series, cohort);

        info!(period = job.period, cohort, seeds = count, "processing period");
        match runner.run_detailed(job.graph, job.weights, &job.seeds) {
            Ok(outcome) => {
                observe(job, cohort, &outcome);
                let topics = outcome.topics;
                let members = topics.iter().map(|t| t.members.len()).sum();
                info!(period = job.period, cohort, topics = topics.len(), "period done");
                report.summaries.push(PeriodSummary {
                    period: job.period,
                    cohort,
                    seeds: count,
                    topics: topics.len(),
                    members,
                });
                report.index.insert(cohort, job.period, topics);
            }
            Err(e) => {
                let kind = e.kind();
                error!(period = job.period, cohort, %kind, error = %e, "period failed");
                report.failures.push(PeriodFailure {
                    period: job.period,
                    cohort,
                    kind,
                    reason: e.to_string(),
                });
            }
        }
    }

    report
}
