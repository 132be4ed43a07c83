//! Persistence records
//!
//! Explicit, versioned record types exchanged with the outside world:
//! graphs, seed lists, cascade step logs, consensus topics and lineages.
//! Vertices are always written as `{id, label}` pairs and sets as full
//! arrays; nothing is truncated on the way out.

pub mod json;
pub mod tsv;

pub use json::{load_graph_dir, read_json, write_json};
pub use tsv::{read_tsv, read_tsv_file, TsvLog, TsvRow, TsvWriter};

use crate::consensus::ConsensusTopic;
use crate::diffusion::CascadeStep;
use crate::graph::{
    EdgeInsert, GraphError, IdSequence, KeywordGraph, Vertex, VertexId, VertexWeights,
};
use crate::lineage::TopicLineage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

/// Version written into every record
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported schema version {found} (expected {expected})")]
    UnsupportedSchema { found: u32, expected: u32 },

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Malformed file name '{0}': expected <period>.json")]
    BadFileName(String),
}

pub type RecordResult<T> = Result<T, RecordError>;

/// Records that carry a schema version
pub trait Versioned {
    fn schema_version(&self) -> u32;

    fn check_version(&self) -> RecordResult<()> {
        match self.schema_version() {
            SCHEMA_VERSION => Ok(()),
            found => Err(RecordError::UnsupportedSchema {
                found,
                expected: SCHEMA_VERSION,
            }),
        }
    }
}

macro_rules! versioned {
    ($($ty:ty),*) => {
        $(impl Versioned for $ty {
            fn schema_version(&self) -> u32 {
                self.schema_version
            }
        })*
    };
}

fn current_version() -> u32 {
    SCHEMA_VERSION
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexRecord {
    pub id: u64,
    pub label: String,
}

impl From<&Vertex> for VertexRecord {
    fn from(v: &Vertex) -> Self {
        VertexRecord {
            id: v.id.as_u64(),
            label: v.label.as_str().to_string(),
        }
    }
}

impl From<&VertexRecord> for Vertex {
    fn from(r: &VertexRecord) -> Self {
        Vertex::new(VertexId::new(r.id), r.label.as_str())
    }
}

fn vertex_records<'a>(vertices: impl IntoIterator<Item = &'a Vertex>) -> Vec<VertexRecord> {
    vertices.into_iter().map(VertexRecord::from).collect()
}

fn resolve_ids(graph: &KeywordGraph, ids: &[VertexId]) -> RecordResult<Vec<VertexRecord>> {
    ids.iter()
        .map(|&id| -> RecordResult<VertexRecord> { Ok(VertexRecord::from(graph.require(id)?)) })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: u64,
    pub target: u64,
    pub contributors: BTreeMap<String, u64>,
}

/// A whole period graph, optionally with its `W(v)` weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRecord {
    #[serde(default = "current_version")]
    pub schema_version: u32,
    pub period: i32,
    pub vertices: Vec<VertexRecord>,
    pub edges: Vec<EdgeRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<BTreeMap<u64, f64>>,
}

impl GraphRecord {
    pub fn from_graph(period: i32, graph: &KeywordGraph, weights: Option<&VertexWeights>) -> Self {
        GraphRecord {
            schema_version: SCHEMA_VERSION,
            period,
            vertices: vertex_records(graph.vertices()),
            edges: graph
                .edges()
                .map(|e| EdgeRecord {
                    source: e.source.as_u64(),
                    target: e.target.as_u64(),
                    contributors: e.contributors.clone(),
                })
                .collect(),
            weights: weights.map(|w| w.iter().map(|(v, &x)| (v.as_u64(), x)).collect()),
        }
    }

    /// Rebuild the graph, drawing any new ids from `ids`
    pub fn into_graph(self, ids: IdSequence) -> RecordResult<(KeywordGraph, Option<VertexWeights>)> {
        self.check_version()?;
        let mut graph = KeywordGraph::with_sequence(ids);
        for v in &self.vertices {
            graph.add_vertex_with_id(VertexId::new(v.id), v.label.as_str())?;
        }
        for e in &self.edges {
            let outcome =
                graph.add_edge_with_contributors(VertexId::new(e.source), VertexId::new(e.target), &e.contributors)?;
            if outcome == EdgeInsert::SkippedSelfLoop {
                warn!(period = self.period, vertex = e.source, "skipping self-loop edge");
            }
        }
        let weights = self
            .weights
            .map(|w| w.into_iter().map(|(id, x)| (VertexId::new(id), x)).collect());
        Ok((graph, weights))
    }
}

/// Ordered seed list of one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRecord {
    #[serde(default = "current_version")]
    pub schema_version: u32,
    pub period: i32,
    pub seeds: Vec<VertexRecord>,
}

impl SeedRecord {
    pub fn new(period: i32, graph: &KeywordGraph, seeds: &[VertexId]) -> RecordResult<Self> {
        Ok(SeedRecord {
            schema_version: SCHEMA_VERSION,
            period,
            seeds: resolve_ids(graph, seeds)?,
        })
    }

    /// Seeds mapped onto `graph` by label; unknown labels are errors
    pub fn seed_ids(&self, graph: &KeywordGraph) -> RecordResult<Vec<VertexId>> {
        self.seeds
            .iter()
            .map(|s| {
                graph
                    .vertex_by_label(&s.label)
                    .map(|v| v.id)
                    .ok_or_else(|| RecordError::Graph(GraphError::LabelNotFound(s.label.as_str().into())))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfectionRecord {
    pub infector: VertexRecord,
    pub infected: Vec<VertexRecord>,
}

/// One cascade step of one trial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    #[serde(default = "current_version")]
    pub schema_version: u32,
    pub period: i32,
    pub trial: usize,
    pub step: usize,
    pub infections: Vec<InfectionRecord>,
}

impl StepRecord {
    pub fn from_step(period: i32, trial: usize, step: &CascadeStep, graph: &KeywordGraph) -> RecordResult<Self> {
        let infections = step
            .infections
            .iter()
            .map(|(&infector, infected)| -> RecordResult<InfectionRecord> {
                Ok(InfectionRecord {
                    infector: VertexRecord::from(graph.require(infector)?),
                    infected: resolve_ids(graph, infected)?,
                })
            })
            .collect::<RecordResult<Vec<_>>>()?;
        Ok(StepRecord {
            schema_version: SCHEMA_VERSION,
            period,
            trial,
            step: step.step,
            infections,
        })
    }

    /// Back to an in-memory step, keyed by vertex id
    pub fn to_step(&self) -> CascadeStep {
        CascadeStep {
            step: self.step,
            infections: self
                .infections
                .iter()
                .map(|i| {
                    (
                        VertexId::new(i.infector.id),
                        i.infected.iter().map(|v| VertexId::new(v.id)).collect(),
                    )
                })
                .collect(),
            cumulative: 0,
        }
    }
}

/// One consensus topic of one period and cohort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRecord {
    #[serde(default = "current_version")]
    pub schema_version: u32,
    pub period: i32,
    pub cohort: usize,
    pub seeds: Vec<VertexRecord>,
    pub members: Vec<VertexRecord>,
}

impl TopicRecord {
    pub fn from_topic(period: i32, cohort: usize, topic: &ConsensusTopic) -> Self {
        TopicRecord {
            schema_version: SCHEMA_VERSION,
            period,
            cohort,
            seeds: vertex_records(&topic.seeds),
            members: vertex_records(&topic.members),
        }
    }

    pub fn to_topic(&self) -> ConsensusTopic {
        ConsensusTopic::new(
            self.seeds.iter().map(Vertex::from),
            self.members.iter().map(Vertex::from),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineageLinkRecord {
    pub period: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    pub seeds: Vec<VertexRecord>,
    pub members: Vec<VertexRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineageRecord {
    #[serde(default = "current_version")]
    pub schema_version: u32,
    pub cohort: usize,
    pub links: Vec<LineageLinkRecord>,
}

impl LineageRecord {
    pub fn from_lineage(lineage: &TopicLineage<'_>) -> Self {
        LineageRecord {
            schema_version: SCHEMA_VERSION,
            cohort: lineage.cohort,
            links: lineage
                .links
                .iter()
                .map(|l| LineageLinkRecord {
                    period: l.period,
                    similarity: l.similarity,
                    seeds: vertex_records(&l.topic.seeds),
                    members: vertex_records(&l.topic.members),
                })
                .collect(),
        }
    }
}

versioned!(GraphRecord, SeedRecord, StepRecord, TopicRecord, LineageRecord);
