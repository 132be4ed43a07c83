//! JSON documents

use super::{GraphRecord, RecordError, RecordResult};
use crate::graph::{IdSequence, KeywordGraph, VertexWeights};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> RecordResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> RecordResult<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// A graph loaded from disk
#[derive(Debug, Clone)]
pub struct PeriodGraph {
    pub period: i32,
    pub graph: KeywordGraph,
    pub weights: Option<VertexWeights>,
}

/// Load every `<period>.json` graph record in `dir`, ordered by period.
///
/// All graphs share `ids`. Files with other extensions are ignored.
pub fn load_graph_dir(dir: impl AsRef<Path>, ids: &IdSequence) -> RecordResult<Vec<PeriodGraph>> {
    let dir = dir.as_ref();
    let mut graphs = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let period: i32 = stem
            .parse()
            .map_err(|_| RecordError::BadFileName(path.display().to_string()))?;

        let record: GraphRecord = read_json(&path)?;
        let (graph, weights) = record.into_graph(ids.clone())?;
        debug!(period, vertices = graph.vertex_count(), edges = graph.edge_count(), "loaded graph");
        graphs.push(PeriodGraph { period, graph, weights });
    }

    graphs.sort_by_key(|g| g.period);
    info!(dir = %dir.display(), periods = graphs.len(), "loaded period graphs");
    Ok(graphs)
}
