//! Graph algorithms consumed by the Topicflow diffusion pipeline.
//!
//! Everything here runs on a [`GraphView`], a dense CSR snapshot of the
//! keyword graph. Undirected graphs are represented by storing each edge
//! in both directions.

pub mod common;
pub mod community;
pub mod pagerank;
pub mod pathfinding;
pub mod centrality;
pub mod topology;

pub use common::{GraphView, NodeId};
pub use community::{weakly_connected_components, WccResult};
pub use pagerank::{page_rank, PageRankConfig};
pub use pathfinding::bfs_distances;
pub use centrality::{degree_centrality, harmonic_closeness};
pub use topology::local_clustering_coefficient;
