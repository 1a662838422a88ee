//! Adjacency-list graphs with per-node edge partitions.
//!
//! A graph is one ordered sequence of edge records per node.  Undirected
//! edges are stored as a mirrored pair of records; embedded flavours also
//! record where each record's mirror lives, so the order of a node's edges can
//! carry meaning (a rotation system) and survives every mutation.

pub mod connectivity;
pub mod edge;
pub mod error;
pub mod flavour;
pub mod graph;
pub mod nodes;
pub mod storage;
pub mod tracing_support;
pub mod tree;
pub mod weight;

mod util;

#[cfg(test)]
mod graph_test_support;
#[cfg(test)]
mod test_util;

pub use connectivity::{Connectivity, EdgeInit, EdgePosition, EdgeRecord, EdgeRef, Edges};
pub use edge::Edge;
pub use error::{ErrorKind, GraphError};
pub use flavour::{Directed, DirectedEmbedded, Flavour, Undirected, UndirectedEmbedded};
pub use graph::{
    DirectedEmbeddedGraph, DirectedGraph, Graph, UndirectedEmbeddedGraph, UndirectedGraph,
};
pub use nodes::NodeWeights;
pub use storage::{Bucketed, Contiguous, PartitionedStorage, StorageSelector};
pub use tree::{TreeInit, TreeLinkDirection};
pub use weight::{Independent, Shared, WeightHandle, WeightSharing};
