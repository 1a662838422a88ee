//! Per-node weights, kept parallel to the partitions of a [`Connectivity`](crate::Connectivity).

use std::fmt::Debug;

use derivative::Derivative;

use crate::error::{GraphError, check_node};

/// One weight per node.  Graphs without node weights use `N = ()`.
#[derive(Derivative)]
#[derivative(
    Clone(bound = "N: Clone"),
    Debug(bound = "N: Debug"),
    PartialEq(bound = "N: PartialEq"),
    Default(bound = "")
)]
pub struct NodeWeights<N> {
    weights: Vec<N>,
}

impl<N> NodeWeights<N> {
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn get(&self, node: usize) -> Result<&N, GraphError> {
        check_node("node_weight", node, self.len())?;
        Ok(&self.weights[node])
    }

    /// Replaces the weight of `node`, returning the old one.
    pub fn set(&mut self, node: usize, weight: N) -> Result<N, GraphError> {
        check_node("set_node_weight", node, self.len())?;
        Ok(std::mem::replace(&mut self.weights[node], weight))
    }

    pub fn mutate<R>(&mut self, node: usize, f: impl FnOnce(&mut N) -> R) -> Result<R, GraphError> {
        check_node("mutate_node_weight", node, self.len())?;
        Ok(f(&mut self.weights[node]))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, N> {
        self.weights.iter()
    }

    pub fn as_slice(&self) -> &[N] {
        &self.weights
    }

    pub(crate) fn insert(&mut self, pos: usize, weight: N) {
        self.weights.insert(pos, weight);
    }

    pub(crate) fn remove(&mut self, node: usize) -> N {
        self.weights.remove(node)
    }

    pub(crate) fn swap(&mut self, i: usize, j: usize) {
        self.weights.swap(i, j);
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.weights.reserve(additional);
    }

    pub fn capacity(&self) -> usize {
        self.weights.capacity()
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.weights.shrink_to_fit();
    }

    pub(crate) fn clear(&mut self) {
        self.weights.clear();
    }
}

impl<N> From<Vec<N>> for NodeWeights<N> {
    fn from(weights: Vec<N>) -> Self {
        NodeWeights { weights }
    }
}

impl<'a, N> IntoIterator for &'a NodeWeights<N> {
    type Item = &'a N;
    type IntoIter = std::slice::Iter<'a, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
