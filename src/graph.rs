//! [`Graph`] composes a [`Connectivity`] with per-node weights and presents
//! them as one value.
//!
//! The flavour, storage strategy and weight sharing policy are type
//! parameters fixed for the lifetime of a graph:
//!
//! - flavour: [`Directed`], [`Undirected`], [`DirectedEmbedded`] or
//!   [`UndirectedEmbedded`];
//! - storage: [`Contiguous`] or [`Bucketed`];
//! - sharing: [`Independent`] or [`Shared`].
//!
//! Node and edge weights default to `()`, meaning no weights.
//!
//! [`Directed`]: crate::Directed
//! [`Undirected`]: crate::Undirected
//! [`DirectedEmbedded`]: crate::DirectedEmbedded
//! [`UndirectedEmbedded`]: crate::UndirectedEmbedded
//! [`Bucketed`]: crate::Bucketed
//! [`Shared`]: crate::Shared

use std::{cmp::Ordering, fmt::Debug, ops::RangeBounds};

use crate::{
    connectivity::{Connectivity, EdgeInit, EdgePosition, EdgeRecord, EdgeRef, Edges},
    error::GraphError,
    flavour::{Directed, DirectedEmbedded, Flavour, Undirected, UndirectedEmbedded},
    nodes::NodeWeights,
    storage::{Contiguous, StorageSelector},
    util::permute_by_swaps,
    weight::{Independent, WeightSharing},
};

pub type DirectedGraph<N = (), W = (), St = Contiguous, Sh = Independent> =
    Graph<Directed, N, W, St, Sh>;
pub type UndirectedGraph<N = (), W = (), St = Contiguous, Sh = Independent> =
    Graph<Undirected, N, W, St, Sh>;
pub type DirectedEmbeddedGraph<N = (), W = (), St = Contiguous, Sh = Independent> =
    Graph<DirectedEmbedded, N, W, St, Sh>;
pub type UndirectedEmbeddedGraph<N = (), W = (), St = Contiguous, Sh = Independent> =
    Graph<UndirectedEmbedded, N, W, St, Sh>;

pub struct Graph<F, N = (), W = (), St = Contiguous, Sh = Independent>
where
    F: Flavour,
    St: StorageSelector,
    Sh: WeightSharing,
{
    connectivity: Connectivity<F, W, St, Sh>,
    nodes: NodeWeights<N>,
}

impl<F, N, W, St, Sh> Default for Graph<F, N, W, St, Sh>
where
    F: Flavour,
    St: StorageSelector,
    Sh: WeightSharing,
{
    fn default() -> Self {
        Graph {
            connectivity: Connectivity::default(),
            nodes: NodeWeights::default(),
        }
    }
}

impl<F, N, W, St, Sh> Graph<F, N, W, St, Sh>
where
    F: Flavour,
    St: StorageSelector,
    Sh: WeightSharing,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from per-node half-edge lists.  Every node gets the
    /// default weight.
    pub fn from_edges(edges: Vec<Vec<EdgeInit<W>>>) -> Result<Self, GraphError>
    where
        N: Default,
        W: Clone + PartialEq,
    {
        let connectivity = Connectivity::from_edges(edges)?;
        let nodes: Vec<N> = (0..connectivity.order()).map(|_| N::default()).collect();
        Ok(Graph {
            connectivity,
            nodes: NodeWeights::from(nodes),
        })
    }

    /// Builds a graph from per-node half-edge lists and a parallel list of
    /// node weights.  The two lists must have the same length.
    pub fn from_edges_and_weights(
        edges: Vec<Vec<EdgeInit<W>>>,
        weights: Vec<N>,
    ) -> Result<Self, GraphError>
    where
        W: Clone + PartialEq,
    {
        if edges.len() != weights.len() {
            return Err(GraphError::InconsistentInitialization {
                weights: weights.len(),
                partitions: edges.len(),
            });
        }
        Ok(Graph {
            connectivity: Connectivity::from_edges(edges)?,
            nodes: NodeWeights::from(weights),
        })
    }

    pub fn connectivity(&self) -> &Connectivity<F, W, St, Sh> {
        &self.connectivity
    }

    pub fn node_weights(&self) -> &NodeWeights<N> {
        &self.nodes
    }

    // ==================== Queries ====================

    pub fn order(&self) -> usize {
        self.connectivity.order()
    }

    pub fn size(&self) -> usize {
        self.connectivity.size()
    }

    pub fn is_empty(&self) -> bool {
        self.connectivity.is_empty()
    }

    pub fn edges(&self, node: usize) -> Result<Edges<'_, EdgeRecord<F, W, Sh>>, GraphError> {
        self.connectivity.edges(node)
    }

    pub fn edge(&self, pos: EdgePosition) -> Result<EdgeRef<'_, EdgeRecord<F, W, Sh>>, GraphError> {
        self.connectivity.edge(pos)
    }

    pub fn partition_len(&self, node: usize) -> Result<usize, GraphError> {
        self.connectivity.partition_len(node)
    }

    pub fn node_weight(&self, node: usize) -> Result<&N, GraphError> {
        self.nodes.get(node)
    }

    // ==================== Nodes ====================

    pub fn add_node(&mut self, weight: N) -> usize {
        self.insert_node(self.order(), weight)
    }

    /// Inserts a node at `pos`, clamped to the current order.  Returns the
    /// index of the new node.
    pub fn insert_node(&mut self, pos: usize, weight: N) -> usize {
        let pos = self.connectivity.insert_node(pos);
        self.nodes.insert(pos, weight);
        pos
    }

    /// Inserts a node whose weight is produced by `make`.  The weight is
    /// built before anything is committed, so on failure the graph is left
    /// exactly as it was.
    pub fn try_insert_node_with<E>(
        &mut self,
        pos: usize,
        make: impl FnOnce() -> Result<N, E>,
    ) -> Result<usize, E> {
        let weight = make()?;
        Ok(self.insert_node(pos, weight))
    }

    /// Removes `node` and every edge incident to it.  Returns its weight.
    pub fn erase_node(&mut self, node: usize) -> Result<N, GraphError> {
        self.connectivity.erase_node(node)?;
        Ok(self.nodes.remove(node))
    }

    pub fn swap_nodes(&mut self, i: usize, j: usize) -> Result<(), GraphError> {
        self.connectivity.swap_nodes(i, j)?;
        self.nodes.swap(i, j);
        Ok(())
    }

    /// Reorders the nodes so that their weights are sorted by `compare`.
    /// Edges follow their end points.
    pub fn sort_nodes(&mut self, mut compare: impl FnMut(&N, &N) -> Ordering) {
        let mut order: Vec<usize> = (0..self.order()).collect();
        let weights = self.nodes.as_slice();
        order.sort_by(|&a, &b| compare(&weights[a], &weights[b]));
        permute_by_swaps(0, &order, |i, j| {
            self.connectivity.swap_nodes_unchecked(i, j);
            self.nodes.swap(i, j);
        });
    }

    pub fn set_node_weight(&mut self, node: usize, weight: N) -> Result<N, GraphError> {
        self.nodes.set(node, weight)
    }

    pub fn mutate_node_weight<R>(
        &mut self,
        node: usize,
        f: impl FnOnce(&mut N) -> R,
    ) -> Result<R, GraphError> {
        self.nodes.mutate(node, f)
    }

    // ==================== Edges ====================

    pub fn join(&mut self, u: usize, v: usize, weight: W) -> Result<EdgePosition, GraphError>
    where
        W: Clone,
    {
        self.connectivity.join(u, v, weight)
    }

    pub fn insert_join(
        &mut self,
        first: EdgePosition,
        second: EdgePosition,
        weight: W,
    ) -> Result<EdgePosition, GraphError>
    where
        W: Clone,
    {
        self.connectivity.insert_join(first, second, weight)
    }

    pub fn insert_loop(
        &mut self,
        at: EdgePosition,
        second_index: usize,
        weight: W,
    ) -> Result<EdgePosition, GraphError>
    where
        W: Clone,
    {
        self.connectivity.insert_loop(at, second_index, weight)
    }

    pub fn erase_edge(&mut self, pos: EdgePosition) -> Result<(), GraphError>
    where
        W: PartialEq,
    {
        self.connectivity.erase_edge(pos)
    }

    pub fn swap_edges(&mut self, node: usize, i: usize, j: usize) -> Result<(), GraphError> {
        self.connectivity.swap_edges(node, i, j)
    }

    pub fn sort_edges<R, C>(&mut self, node: usize, range: R, compare: C) -> Result<(), GraphError>
    where
        R: RangeBounds<usize>,
        C: FnMut(&EdgeRecord<F, W, Sh>, &EdgeRecord<F, W, Sh>) -> Ordering,
    {
        self.connectivity.sort_edges(node, range, compare)
    }

    pub fn stable_sort_edges<R, C>(
        &mut self,
        node: usize,
        range: R,
        compare: C,
    ) -> Result<(), GraphError>
    where
        R: RangeBounds<usize>,
        C: FnMut(&EdgeRecord<F, W, Sh>, &EdgeRecord<F, W, Sh>) -> Ordering,
    {
        self.connectivity.stable_sort_edges(node, range, compare)
    }

    pub fn set_edge_weight(&mut self, pos: EdgePosition, weight: W) -> Result<W, GraphError>
    where
        W: Clone + PartialEq,
    {
        self.connectivity.set_edge_weight(pos, weight)
    }

    pub fn mutate_edge_weight<R>(
        &mut self,
        pos: EdgePosition,
        f: impl FnOnce(&mut W) -> R,
    ) -> Result<R, GraphError>
    where
        W: Clone + PartialEq,
    {
        self.connectivity.mutate_edge_weight(pos, f)
    }

    // ==================== Capacity ====================

    pub fn reserve_nodes(&mut self, additional: usize) {
        self.connectivity.reserve_partitions(additional);
        self.nodes.reserve(additional);
    }

    pub fn node_capacity(&self) -> usize {
        self.nodes.capacity().min(self.connectivity.partitions_capacity())
    }

    pub fn reserve_edges(&mut self, additional: usize) {
        self.connectivity.reserve_edges(additional);
    }

    pub fn reserve_partition(&mut self, node: usize, additional: usize) -> Result<(), GraphError> {
        self.connectivity.reserve_partition(node, additional)
    }

    pub fn edges_capacity(&self) -> usize {
        self.connectivity.edges_capacity()
    }

    pub fn shrink_to_fit(&mut self) {
        self.connectivity.shrink_to_fit();
        self.nodes.shrink_to_fit();
    }

    pub fn clear(&mut self) {
        self.connectivity.clear();
        self.nodes.clear();
    }
}

impl<F, N, W, St, Sh> Clone for Graph<F, N, W, St, Sh>
where
    F: Flavour,
    N: Clone,
    W: Clone,
    St: StorageSelector,
    Sh: WeightSharing,
{
    fn clone(&self) -> Self {
        Graph {
            connectivity: self.connectivity.clone(),
            nodes: self.nodes.clone(),
        }
    }
}

impl<F, N, W, St, Sh> PartialEq for Graph<F, N, W, St, Sh>
where
    F: Flavour,
    N: PartialEq,
    St: StorageSelector,
    Sh: WeightSharing,
    EdgeRecord<F, W, Sh>: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.connectivity == other.connectivity && self.nodes == other.nodes
    }
}

impl<F, N, W, St, Sh> Debug for Graph<F, N, W, St, Sh>
where
    F: Flavour,
    N: Debug,
    St: StorageSelector,
    Sh: WeightSharing,
    EdgeRecord<F, W, Sh>: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("connectivity", &self.connectivity)
            .field("nodes", &self.nodes)
            .finish()
    }
}
