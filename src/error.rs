use thiserror::Error;

use crate::graph::GraphNodeId;

/// Errors raised by graph operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A requested node does not exist in the graph.
    #[error("node {0:?} not found in graph")]
    NodeNotFound(GraphNodeId),
}
