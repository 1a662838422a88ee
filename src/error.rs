//! Errors reported by graph operations.

/// The two classes of failure a graph operation can report.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// A node index, edge position or insertion point lies outside its valid bound.
    OutOfRange,
    /// Construction input is structurally inconsistent.
    Logic,
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("{operation}: node index {node} out of range - graph order is {order}")]
    NodeOutOfRange {
        operation: &'static str,
        node: usize,
        order: usize,
    },
    #[error(
        "{operation}: edge index {position} out of range for node {node}, which has {len} edge(s)"
    )]
    EdgeOutOfRange {
        operation: &'static str,
        node: usize,
        position: usize,
        len: usize,
    },
    #[error(
        "{operation}: insertion position {position} out of range for node {node} - maximum is {max}"
    )]
    InsertionOutOfRange {
        operation: &'static str,
        node: usize,
        position: usize,
        max: usize,
    },
    #[error(
        "complementary index {index} of edge {position} at node {node} out of range - partition {partner} has {len} edge(s)"
    )]
    ComplementaryOutOfRange {
        node: usize,
        position: usize,
        partner: usize,
        index: usize,
        len: usize,
    },
    #[error("number of node weights {weights} does not match number of edge partitions {partitions}")]
    InconsistentInitialization { weights: usize, partitions: usize },
    #[error("reciprocated partial edge does not exist for link {node} -> {target}")]
    AbsentReciprocal { node: usize, target: usize },
    #[error("odd number of loop edges for node {node}")]
    OddLoops { node: usize },
    #[error("indices [{node}, {position}] of edge at node {node} are self-referential")]
    SelfReferential { node: usize, position: usize },
    #[error(
        "reciprocated complementary index {found} of edge [{partner}, {index}] does not match {expected}"
    )]
    MismatchedComplementary {
        partner: usize,
        index: usize,
        found: usize,
        expected: usize,
    },
    #[error(
        "reciprocated end points of edge [{partner}, {index}] do not match edge {position} at node {node}"
    )]
    MismatchedTarget {
        node: usize,
        position: usize,
        partner: usize,
        index: usize,
    },
    #[error("mismatch between weights of edge {position} at node {node} and its reciprocal")]
    MismatchedWeights { node: usize, position: usize },
    #[error("edge {position} at node {node} has neither source nor target equal to its host node")]
    ForeignEmbeddedEdge { node: usize, position: usize },
    #[error("undirected trees can only be linked symmetrically")]
    AsymmetricUndirectedTree,
}

impl GraphError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GraphError::NodeOutOfRange { .. }
            | GraphError::EdgeOutOfRange { .. }
            | GraphError::InsertionOutOfRange { .. }
            | GraphError::ComplementaryOutOfRange { .. } => ErrorKind::OutOfRange,
            _ => ErrorKind::Logic,
        }
    }

    pub fn is_out_of_range(&self) -> bool {
        self.kind() == ErrorKind::OutOfRange
    }

    pub fn is_logic(&self) -> bool {
        self.kind() == ErrorKind::Logic
    }
}

pub(crate) fn check_node(operation: &'static str, node: usize, order: usize) -> Result<(), GraphError> {
    if node < order {
        Ok(())
    } else {
        Err(GraphError::NodeOutOfRange {
            operation,
            node,
            order,
        })
    }
}
