//! Building graphs from nested tree descriptions.

use crate::{
    error::GraphError,
    flavour::Flavour,
    graph::Graph,
    storage::StorageSelector,
    weight::WeightSharing,
};

/// Direction of the edges linking a parent to its children.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum TreeLinkDirection {
    /// Parent to child and child to parent.  One undirected edge for
    /// undirected flavours.
    #[default]
    Symmetric,
    /// Parent to child only.
    Forward,
    /// Child to parent only.
    Backward,
}

/// A node weight with the subtrees hanging off it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TreeInit<N> {
    pub weight: N,
    pub children: Vec<TreeInit<N>>,
}

impl<N> TreeInit<N> {
    pub fn leaf(weight: N) -> Self {
        TreeInit {
            weight,
            children: Vec::new(),
        }
    }

    pub fn new(weight: N, children: Vec<TreeInit<N>>) -> Self {
        TreeInit { weight, children }
    }
}

impl<F, N, W, St, Sh> Graph<F, N, W, St, Sh>
where
    F: Flavour,
    W: Clone + Default,
    St: StorageSelector,
    Sh: WeightSharing,
{
    /// Builds a graph from one tree.  Nodes are numbered in depth-first
    /// pre-order and every edge gets the default weight.
    pub fn from_tree(tree: TreeInit<N>, direction: TreeLinkDirection) -> Result<Self, GraphError> {
        Self::from_forest(vec![tree], direction)
    }

    /// Builds a graph from several disjoint trees.
    pub fn from_forest(
        forest: Vec<TreeInit<N>>,
        direction: TreeLinkDirection,
    ) -> Result<Self, GraphError> {
        if !F::DIRECTED && direction != TreeLinkDirection::Symmetric {
            return Err(GraphError::AsymmetricUndirectedTree);
        }
        let mut graph = Self::new();
        for tree in forest {
            graph.add_subtree(tree, None, direction)?;
        }
        Ok(graph)
    }

    fn add_subtree(
        &mut self,
        tree: TreeInit<N>,
        parent: Option<usize>,
        direction: TreeLinkDirection,
    ) -> Result<(), GraphError> {
        let node = self.add_node(tree.weight);
        if let Some(parent) = parent {
            if F::DIRECTED && direction != TreeLinkDirection::Forward {
                self.join(node, parent, W::default())?;
            }
            if !F::DIRECTED || direction != TreeLinkDirection::Backward {
                self.join(parent, node, W::default())?;
            }
        }
        for child in tree.children {
            self.add_subtree(child, Some(node), direction)?;
        }
        Ok(())
    }
}
