//! The connectivity engine: flavour-aware edge bookkeeping on top of a
//! [`PartitionedStorage`].
//!
//! Every public mutation leaves the structure consistent:
//!
//! * there is exactly one partition per node;
//! * undirected edges are stored as a mirrored pair of records, loops as two
//!   records in the same partition;
//! * directed edges are stored once, in the source's partition, except for the
//!   directed embedded flavour, which also stores them in the target's partition;
//! * in embedded flavours, the record at position `p` of partition `u` names
//!   the position of its mirror, and the mirror names `p` in return;
//! * under the [`Shared`](crate::Shared) policy both records of a pair hold
//!   the same weight.
//!
//! Every operation validates its arguments before touching anything, so a
//! failed call leaves the value unchanged.

use std::{cmp::Ordering, collections::HashMap, fmt::Debug, marker::PhantomData, ops::RangeBounds};

use bitvec::vec::BitVec;

use crate::{
    edge::Edge,
    error::{GraphError, check_node},
    flavour::Flavour,
    storage::{Contiguous, PartitionedStorage, StorageSelector},
    tracing_support::trace_span,
    util::{permute_by_swaps, sort_pair},
    weight::{Independent, WeightHandle, WeightSharing},
};

/// The edge record type used by a connectivity configuration.
pub type EdgeRecord<F, W, Sh> = <F as Flavour>::Edge<W, Sh>;

type HandleOf<W, Sh> = <Sh as WeightSharing>::Handle<W>;

/// Identifies a slot within a partition: either an existing record or, for
/// insertions, the place a new record should go.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EdgePosition {
    pub node: usize,
    pub index: usize,
}

impl EdgePosition {
    pub fn new(node: usize, index: usize) -> Self {
        EdgePosition { node, index }
    }
}

/// One half-edge of an edge-list initializer.
///
/// `complementary_index` is read by the embedded flavours only, `source` by
/// the directed embedded flavour only (`None` means the host node).
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeInit<W> {
    pub source: Option<usize>,
    pub target: usize,
    pub complementary_index: usize,
    pub weight: W,
}

impl<W> EdgeInit<W> {
    pub fn new(target: usize, weight: W) -> Self {
        EdgeInit {
            source: None,
            target,
            complementary_index: 0,
            weight,
        }
    }

    pub fn embedded(target: usize, complementary_index: usize, weight: W) -> Self {
        EdgeInit {
            source: None,
            target,
            complementary_index,
            weight,
        }
    }

    pub fn full(source: usize, target: usize, complementary_index: usize, weight: W) -> Self {
        EdgeInit {
            source: Some(source),
            target,
            complementary_index,
            weight,
        }
    }
}

/// A read cursor onto one edge record.
pub struct EdgeRef<'a, E> {
    node: usize,
    index: usize,
    edge: &'a E,
}

impl<E> Clone for EdgeRef<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for EdgeRef<'_, E> {}

impl<'a, E: Edge> EdgeRef<'a, E> {
    /// The node whose partition holds the record.
    pub fn partition_index(&self) -> usize {
        self.node
    }

    pub fn position_within_partition(&self) -> usize {
        self.index
    }

    pub fn position(&self) -> EdgePosition {
        EdgePosition::new(self.node, self.index)
    }

    pub fn target(&self) -> usize {
        self.edge.target()
    }

    pub fn source(&self) -> usize {
        self.edge.source().unwrap_or(self.node)
    }

    /// The node at the other end of the edge.
    pub fn partner(&self) -> usize {
        self.edge.partner(self.node)
    }

    pub fn complementary_index(&self) -> Option<usize> {
        self.edge.complementary_index()
    }

    /// Returns `false` for the copy of a directed embedded edge held by its target.
    pub fn is_outgoing(&self) -> bool {
        self.source() == self.node
    }

    pub fn weight(&self) -> <E::Handle as WeightHandle<E::Weight>>::Ref<'a> {
        self.edge.handle().get()
    }

    pub fn record(&self) -> &'a E {
        self.edge
    }
}

impl<E: Edge + Debug> Debug for EdgeRef<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeRef")
            .field("node", &self.node)
            .field("index", &self.index)
            .field("edge", self.edge)
            .finish()
    }
}

/// Iterator over the records of one partition, in order.  Use `.rev()` to
/// walk the partition backwards.
pub struct Edges<'a, E> {
    node: usize,
    inner: std::iter::Enumerate<std::slice::Iter<'a, E>>,
}

impl<'a, E> Iterator for Edges<'a, E> {
    type Item = EdgeRef<'a, E>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.node;
        self.inner
            .next()
            .map(|(index, edge)| EdgeRef { node, index, edge })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<E> DoubleEndedIterator for Edges<'_, E> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let node = self.node;
        self.inner
            .next_back()
            .map(|(index, edge)| EdgeRef { node, index, edge })
    }
}

impl<E> ExactSizeIterator for Edges<'_, E> {}

impl<E> std::iter::FusedIterator for Edges<'_, E> {}

/// Per-node edge records for one graph flavour, storage strategy and weight
/// sharing policy.  Nodes carry no data here; see [`Graph`](crate::Graph).
pub struct Connectivity<F, W = (), St = Contiguous, Sh = Independent>
where
    F: Flavour,
    St: StorageSelector,
    Sh: WeightSharing,
{
    storage: St::Storage<EdgeRecord<F, W, Sh>>,
    _flavour: PhantomData<F>,
}

impl<F, W, St, Sh> Default for Connectivity<F, W, St, Sh>
where
    F: Flavour,
    St: StorageSelector,
    Sh: WeightSharing,
{
    fn default() -> Self {
        Connectivity {
            storage: Default::default(),
            _flavour: PhantomData,
        }
    }
}

impl<F, W, St, Sh> Connectivity<F, W, St, Sh>
where
    F: Flavour,
    St: StorageSelector,
    Sh: WeightSharing,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a value with `order` isolated nodes.
    pub fn with_order(order: usize) -> Self {
        let mut connectivity = Self::new();
        connectivity.storage.reserve_partitions(order);
        for _ in 0..order {
            connectivity.storage.add_partition();
        }
        connectivity
    }

    pub fn order(&self) -> usize {
        self.storage.num_partitions()
    }

    /// Number of edges.  A mirrored pair counts once.
    pub fn size(&self) -> usize {
        if F::MIRRORED {
            self.storage.len() / 2
        } else {
            self.storage.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order() == 0
    }

    pub fn partition_len(&self, node: usize) -> Result<usize, GraphError> {
        check_node("partition_len", node, self.order())?;
        Ok(self.storage.partition_len(node))
    }

    pub fn edges(&self, node: usize) -> Result<Edges<'_, EdgeRecord<F, W, Sh>>, GraphError> {
        check_node("edges", node, self.order())?;
        Ok(Edges {
            node,
            inner: self.storage.partition(node).iter().enumerate(),
        })
    }

    pub fn edge(&self, pos: EdgePosition) -> Result<EdgeRef<'_, EdgeRecord<F, W, Sh>>, GraphError> {
        self.check_edge("edge", pos)?;
        Ok(EdgeRef {
            node: pos.node,
            index: pos.index,
            edge: &self.storage.partition(pos.node)[pos.index],
        })
    }

    fn check_edge(&self, operation: &'static str, pos: EdgePosition) -> Result<(), GraphError> {
        check_node(operation, pos.node, self.order())?;
        let len = self.storage.partition_len(pos.node);
        if pos.index < len {
            Ok(())
        } else {
            Err(GraphError::EdgeOutOfRange {
                operation,
                node: pos.node,
                position: pos.index,
                len,
            })
        }
    }

    fn check_insertion(
        &self,
        operation: &'static str,
        node: usize,
        position: usize,
        max: usize,
    ) -> Result<(), GraphError> {
        if position <= max {
            Ok(())
        } else {
            Err(GraphError::InsertionOutOfRange {
                operation,
                node,
                position,
                max,
            })
        }
    }

    // ==================== Joining ====================

    /// Appends an edge from `u` to `v`.  Returns the position of the record
    /// placed in `u`'s partition.
    pub fn join(&mut self, u: usize, v: usize, weight: W) -> Result<EdgePosition, GraphError>
    where
        W: Clone,
    {
        let _span = trace_span!("join", u, v).entered();
        check_node("join", u, self.order())?;
        check_node("join", v, self.order())?;

        let len_u = self.storage.partition_len(u);
        let handle = HandleOf::<W, Sh>::new(weight);
        if !F::MIRRORED {
            self.storage
                .push_to_partition(u, Edge::build(u, v, 0, handle));
        } else if u == v {
            let mirror = handle.mirror();
            self.storage
                .push_to_partition(u, Edge::build(u, u, len_u + 1, handle));
            self.storage
                .push_to_partition(u, Edge::build_mirror(u, u, len_u, mirror));
        } else {
            let len_v = self.storage.partition_len(v);
            let mirror = handle.mirror();
            self.storage
                .push_to_partition(u, Edge::build(u, v, len_v, handle));
            self.storage
                .push_to_partition(v, Edge::build_mirror(u, v, len_u, mirror));
        }
        Ok(EdgePosition::new(u, len_u))
    }

    /// Inserts an edge from `first.node` to `second.node`, placing its records
    /// at the given positions.  Positions are taken before anything is
    /// inserted.  When both positions name the same node this is
    /// [`insert_loop`](Self::insert_loop).  The directed flavour stores no
    /// mirror and ignores `second.index`.
    pub fn insert_join(
        &mut self,
        first: EdgePosition,
        second: EdgePosition,
        weight: W,
    ) -> Result<EdgePosition, GraphError>
    where
        W: Clone,
    {
        check_node("insert_join", first.node, self.order())?;
        check_node("insert_join", second.node, self.order())?;
        if first.node == second.node {
            return self.insert_loop(first, second.index, weight);
        }
        let _span = trace_span!("insert_join", u = first.node, v = second.node).entered();

        let (u, v) = (first.node, second.node);
        self.check_insertion("insert_join", u, first.index, self.storage.partition_len(u))?;
        let handle = HandleOf::<W, Sh>::new(weight);
        if !F::MIRRORED {
            self.storage
                .insert_to_partition(u, first.index, Edge::build(u, v, 0, handle));
            return Ok(first);
        }
        self.check_insertion("insert_join", v, second.index, self.storage.partition_len(v))?;

        let mirror = handle.mirror();
        self.insert_and_repair(u, first.index, Edge::build(u, v, second.index, handle), None);
        self.insert_and_repair(v, second.index, Edge::build_mirror(u, v, first.index, mirror), None);
        Ok(first)
    }

    /// Inserts a loop at `at.node`.  The first record goes to `at.index`; the
    /// second goes to `second_index`, counted in the partition as it stands
    /// after the first insertion.  Returns the final position of the first
    /// record.
    pub fn insert_loop(
        &mut self,
        at: EdgePosition,
        second_index: usize,
        weight: W,
    ) -> Result<EdgePosition, GraphError>
    where
        W: Clone,
    {
        let _span = trace_span!("insert_loop", node = at.node, index = at.index, second_index).entered();
        let node = at.node;
        check_node("insert_loop", node, self.order())?;
        let len = self.storage.partition_len(node);
        self.check_insertion("insert_loop", node, at.index, len)?;

        let handle = HandleOf::<W, Sh>::new(weight);
        if !F::MIRRORED {
            self.storage
                .insert_to_partition(node, at.index, Edge::build(node, node, 0, handle));
            return Ok(at);
        }
        self.check_insertion("insert_loop", node, second_index, len + 1)?;

        let mirror = handle.mirror();
        let mut first = at.index;
        self.insert_and_repair(node, first, Edge::build(node, node, second_index, handle), None);
        if second_index <= first {
            first += 1;
        }
        self.insert_and_repair(
            node,
            second_index,
            Edge::build_mirror(node, node, first, mirror),
            Some(first),
        );
        Ok(EdgePosition::new(node, first))
    }

    // ==================== Erasing ====================

    /// Removes the edge with a record at `pos`, together with its mirror.
    pub fn erase_edge(&mut self, pos: EdgePosition) -> Result<(), GraphError>
    where
        W: PartialEq,
    {
        let _span = trace_span!("erase_edge", node = pos.node, index = pos.index).entered();
        self.check_edge("erase_edge", pos)?;
        match self.mirror_position(pos) {
            None => self.remove_positions(pos.node, &[pos.index]),
            Some(mirror) if mirror.node == pos.node => {
                let (a, b) = sort_pair(pos.index, mirror.index);
                self.remove_positions(pos.node, &[a, b]);
            }
            Some(mirror) => {
                self.remove_positions(pos.node, &[pos.index]);
                self.remove_positions(mirror.node, &[mirror.index]);
            }
        }
        Ok(())
    }

    /// Locates the mirror of the record at `pos`, which must be valid.
    pub(crate) fn mirror_position(&self, pos: EdgePosition) -> Option<EdgePosition>
    where
        W: PartialEq,
    {
        if !F::MIRRORED {
            return None;
        }
        let edge = &self.storage.partition(pos.node)[pos.index];
        let partner = edge.partner(pos.node);
        if let Some(index) = edge.complementary_index() {
            return Some(EdgePosition::new(partner, index));
        }
        self.storage
            .partition(partner)
            .iter()
            .enumerate()
            .position(|(index, candidate)| {
                (partner != pos.node || index != pos.index)
                    && candidate.target() == pos.node
                    && candidate.handle().matches(edge.handle())
            })
            .map(|index| EdgePosition::new(partner, index))
    }

    // ==================== Reordering ====================

    /// Exchanges records `i` and `j` of `node`'s partition.
    pub fn swap_edges(&mut self, node: usize, i: usize, j: usize) -> Result<(), GraphError> {
        let _span = trace_span!("swap_edges", node, i, j).entered();
        self.check_edge("swap_edges", EdgePosition::new(node, i))?;
        self.check_edge("swap_edges", EdgePosition::new(node, j))?;
        self.swap_unchecked(node, i, j);
        Ok(())
    }

    fn swap_unchecked(&mut self, node: usize, i: usize, j: usize) {
        if i == j {
            return;
        }
        self.storage.swap((node, i), (node, j));
        self.repair_complements(node, [i, j].into_iter(), |k| {
            if k == i {
                j
            } else if k == j {
                i
            } else {
                k
            }
        });
    }

    /// Sorts part of `node`'s partition with an unstable sort.
    pub fn sort_edges<R, C>(&mut self, node: usize, range: R, compare: C) -> Result<(), GraphError>
    where
        R: RangeBounds<usize>,
        C: FnMut(&EdgeRecord<F, W, Sh>, &EdgeRecord<F, W, Sh>) -> Ordering,
    {
        self.sort_edges_by(node, range, compare, false)
    }

    /// Sorts part of `node`'s partition, keeping equal records in order.
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
        self.sort_edges_by(node, range, compare, true)
    }

    fn sort_edges_by<R, C>(
        &mut self,
        node: usize,
        range: R,
        mut compare: C,
        stable: bool,
    ) -> Result<(), GraphError>
    where
        R: RangeBounds<usize>,
        C: FnMut(&EdgeRecord<F, W, Sh>, &EdgeRecord<F, W, Sh>) -> Ordering,
    {
        let _span = trace_span!("sort_edges", node, stable).entered();
        check_node("sort_edges", node, self.order())?;
        let len = self.storage.partition_len(node);
        let start = match range.start_bound() {
            std::ops::Bound::Included(&s) => s,
            std::ops::Bound::Excluded(&s) => s + 1,
            std::ops::Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            std::ops::Bound::Included(&e) => e + 1,
            std::ops::Bound::Excluded(&e) => e,
            std::ops::Bound::Unbounded => len,
        };
        if end > len || start > end {
            return Err(GraphError::EdgeOutOfRange {
                operation: "sort_edges",
                node,
                position: end.max(start),
                len,
            });
        }

        let mut order: Vec<usize> = (start..end).collect();
        {
            let partition = self.storage.partition(node);
            let by = |a: &usize, b: &usize| compare(&partition[*a], &partition[*b]);
            if stable {
                order.sort_by(by);
            } else {
                order.sort_unstable_by(by);
            }
        }

        // Permute through swaps so complementary indices follow the records.
        permute_by_swaps(start, &order, |from, to| self.swap_unchecked(node, from, to));
        Ok(())
    }

    /// Exchanges the labels of nodes `i` and `j`.
    pub fn swap_nodes(&mut self, i: usize, j: usize) -> Result<(), GraphError> {
        let _span = trace_span!("swap_nodes", i, j).entered();
        check_node("swap_nodes", i, self.order())?;
        check_node("swap_nodes", j, self.order())?;
        self.swap_nodes_unchecked(i, j);
        Ok(())
    }

    pub(crate) fn swap_nodes_unchecked(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        self.relabel(|n| {
            if n == i {
                j
            } else if n == j {
                i
            } else {
                n
            }
        });
        self.storage.swap_partitions(i, j);
    }

    // ==================== Nodes ====================

    pub fn add_node(&mut self) -> usize {
        self.insert_node(self.order())
    }

    /// Inserts an isolated node at `pos`, clamped to the current order.
    /// Nodes at or after `pos` are renumbered upwards.  Returns the index of
    /// the new node.
    pub fn insert_node(&mut self, pos: usize) -> usize {
        let pos = pos.min(self.order());
        let _span = trace_span!("insert_node", pos).entered();
        self.storage.insert_partition(pos);
        if pos + 1 < self.order() {
            self.relabel(|n| if n >= pos { n + 1 } else { n });
        }
        pos
    }

    /// Removes `node` together with every edge incident to it.  Nodes after
    /// it are renumbered downwards.
    pub fn erase_node(&mut self, node: usize) -> Result<(), GraphError> {
        let _span = trace_span!("erase_node", node).entered();
        check_node("erase_node", node, self.order())?;

        let order = self.order();
        let mut affected: BitVec = BitVec::repeat(!F::MIRRORED, order);
        if F::MIRRORED {
            for edge in self.storage.partition(node) {
                affected.set(edge.partner(node), true);
            }
        }
        affected.set(node, false);

        for other in affected.iter_ones() {
            let doomed: Vec<usize> = self
                .storage
                .partition(other)
                .iter()
                .enumerate()
                .filter(|(_, edge)| edge.target() == node || edge.source() == Some(node))
                .map(|(index, _)| index)
                .collect();
            if !doomed.is_empty() {
                self.remove_positions(other, &doomed);
            }
        }

        self.storage.remove_partition(node)?;
        self.relabel(|n| if n > node { n - 1 } else { n });
        Ok(())
    }

    // ==================== Weights ====================

    /// Replaces the weight of the edge at `pos`, returning the old value.
    /// Under the independent policy the mirror is updated as well.
    pub fn set_edge_weight(&mut self, pos: EdgePosition, weight: W) -> Result<W, GraphError>
    where
        W: Clone + PartialEq,
    {
        self.check_edge("set_edge_weight", pos)?;
        if let Some(mirror) = self.independent_mirror(pos) {
            self.handle_mut(mirror).set(weight.clone());
        }
        Ok(self.handle_mut(pos).set(weight))
    }

    /// Applies `f` to the weight of the edge at `pos`.  Under the independent
    /// policy the mirror receives a copy of the result.
    pub fn mutate_edge_weight<R>(
        &mut self,
        pos: EdgePosition,
        f: impl FnOnce(&mut W) -> R,
    ) -> Result<R, GraphError>
    where
        W: Clone + PartialEq,
    {
        self.check_edge("mutate_edge_weight", pos)?;
        let mirror = self.independent_mirror(pos);
        let result = self.handle_mut(pos).mutate(f);
        if let Some(mirror) = mirror {
            let updated = W::clone(&self.storage.partition(pos.node)[pos.index].handle().get());
            self.handle_mut(mirror).set(updated);
        }
        Ok(result)
    }

    fn independent_mirror(&self, pos: EdgePosition) -> Option<EdgePosition>
    where
        W: PartialEq,
    {
        if Sh::is_shared() {
            None
        } else {
            self.mirror_position(pos)
        }
    }

    fn handle_mut(&mut self, pos: EdgePosition) -> &mut HandleOf<W, Sh> {
        self.storage.partition_mut(pos.node)[pos.index].handle_mut()
    }

    // ==================== Capacity ====================

    pub fn reserve_edges(&mut self, additional: usize) {
        self.storage.reserve(additional);
    }

    pub fn reserve_partition(&mut self, node: usize, additional: usize) -> Result<(), GraphError> {
        check_node("reserve_partition", node, self.order())?;
        self.storage.reserve_partition(node, additional);
        Ok(())
    }

    pub fn reserve_partitions(&mut self, additional: usize) {
        self.storage.reserve_partitions(additional);
    }

    pub fn edges_capacity(&self) -> usize {
        self.storage.capacity()
    }

    pub fn partitions_capacity(&self) -> usize {
        self.storage.partitions_capacity()
    }

    pub fn shrink_to_fit(&mut self) {
        self.storage.shrink_to_fit();
    }

    pub fn clear(&mut self) {
        self.storage.clear();
    }

    // ==================== Bookkeeping ====================

    fn relabel(&mut self, f: impl Fn(usize) -> usize) {
        for node in 0..self.order() {
            for edge in self.storage.partition_mut(node) {
                edge.relabel(&f);
            }
        }
    }

    fn insert_and_repair(
        &mut self,
        node: usize,
        pos: usize,
        edge: EdgeRecord<F, W, Sh>,
        settled: Option<usize>,
    ) {
        self.storage.insert_to_partition(node, pos, edge);
        let len = self.storage.partition_len(node);
        self.repair_complements(
            node,
            (pos + 1..len).filter(|&q| Some(q) != settled),
            |k| if k >= pos { k + 1 } else { k },
        );
    }

    /// Removes the records at `positions` (ascending, distinct) from `node`'s
    /// partition.  Their mirrors are left alone.
    fn remove_positions(&mut self, node: usize, positions: &[usize]) {
        let Some(&lowest) = positions.first() else {
            return;
        };
        for &pos in positions.iter().rev() {
            self.storage.remove_from_partition(node, pos);
        }
        let len = self.storage.partition_len(node);
        self.repair_complements(node, lowest..len, |k| {
            k - positions.iter().take_while(|&&p| p < k).count()
        });
    }

    /// Restores complementary indices after records of `node`'s partition
    /// moved.  `moved` yields the current positions of the moved records and
    /// `remap` maps a former position in the partition to the current one.
    fn repair_complements(
        &mut self,
        node: usize,
        moved: impl Iterator<Item = usize>,
        remap: impl Fn(usize) -> usize,
    ) {
        if !F::EMBEDDED {
            return;
        }
        let fixes: Vec<(usize, usize, usize)> = {
            let partition = self.storage.partition(node);
            moved
                .filter_map(|q| {
                    let edge = &partition[q];
                    let former = edge.complementary_index()?;
                    let partner = edge.partner(node);
                    let mirror = if partner == node { remap(former) } else { former };
                    Some((q, partner, mirror))
                })
                .collect()
        };
        for (q, partner, mirror) in fixes {
            if partner == node {
                self.storage.partition_mut(node)[q].set_complementary_index(mirror);
            }
            self.storage.partition_mut(partner)[mirror].set_complementary_index(q);
        }
    }

    // ==================== Construction ====================

    /// Builds a value from per-node lists of half-edges, validating that the
    /// lists describe a consistent graph of this flavour.
    pub fn from_edges(edges: Vec<Vec<EdgeInit<W>>>) -> Result<Self, GraphError>
    where
        W: Clone + PartialEq,
    {
        let _span = trace_span!("from_edges", order = edges.len()).entered();
        let order = edges.len();
        for (node, list) in edges.iter().enumerate() {
            for init in list {
                check_node("from_edges", init.target, order)?;
                if F::DIRECTED && F::EMBEDDED {
                    check_node("from_edges", init.source.unwrap_or(node), order)?;
                }
            }
        }

        let pairs = if !F::MIRRORED {
            Vec::new()
        } else if F::EMBEDDED {
            validate_embedded::<F, W>(&edges)?
        } else {
            pair_undirected(&edges)?
        };

        let mut connectivity = Self::with_order(order);
        let total = edges.iter().map(Vec::len).sum();
        connectivity.storage.reserve(total);
        for (node, list) in edges.into_iter().enumerate() {
            connectivity.storage.reserve_partition(node, list.len());
            for (index, init) in list.into_iter().enumerate() {
                let earlier = pairs
                    .get(node)
                    .map(|row: &Vec<EdgePosition>| row[index])
                    .filter(|mirror| (mirror.node, mirror.index) < (node, index));
                let handle = match earlier {
                    Some(mirror) => connectivity.storage.partition(mirror.node)[mirror.index]
                        .handle()
                        .mirror(),
                    None => HandleOf::<W, Sh>::new(init.weight),
                };
                let edge = Edge::build(
                    init.source.unwrap_or(node),
                    init.target,
                    init.complementary_index,
                    handle,
                );
                connectivity.storage.push_to_partition(node, edge);
            }
        }
        Ok(connectivity)
    }
}

/// Checks the complementary indices of an embedded initializer.  Returns the
/// mirror position of every half-edge.
fn validate_embedded<F: Flavour, W: PartialEq>(
    edges: &[Vec<EdgeInit<W>>],
) -> Result<Vec<Vec<EdgePosition>>, GraphError> {
    let mut pairs = Vec::with_capacity(edges.len());
    for (node, list) in edges.iter().enumerate() {
        let mut row = Vec::with_capacity(list.len());
        for (position, init) in list.iter().enumerate() {
            let source = if F::DIRECTED {
                init.source.unwrap_or(node)
            } else {
                node
            };
            if source != node && init.target != node {
                return Err(GraphError::ForeignEmbeddedEdge { node, position });
            }
            let partner = if init.target == node {
                source
            } else {
                init.target
            };
            let index = init.complementary_index;
            let len = edges[partner].len();
            if index >= len {
                return Err(GraphError::ComplementaryOutOfRange {
                    node,
                    position,
                    partner,
                    index,
                    len,
                });
            }
            if partner == node && index == position {
                return Err(GraphError::SelfReferential { node, position });
            }
            let mirror = &edges[partner][index];
            if mirror.complementary_index != position {
                return Err(GraphError::MismatchedComplementary {
                    partner,
                    index,
                    found: mirror.complementary_index,
                    expected: position,
                });
            }
            let ends_match = if F::DIRECTED {
                mirror.source.unwrap_or(partner) == source && mirror.target == init.target
            } else {
                mirror.target == node
            };
            if !ends_match {
                return Err(GraphError::MismatchedTarget {
                    node,
                    position,
                    partner,
                    index,
                });
            }
            if mirror.weight != init.weight {
                return Err(GraphError::MismatchedWeights { node, position });
            }
            row.push(EdgePosition::new(partner, index));
        }
        pairs.push(row);
    }
    Ok(pairs)
}

/// Pairs the half-edges of an undirected initializer greedily, in order.
fn pair_undirected<W: PartialEq>(
    edges: &[Vec<EdgeInit<W>>],
) -> Result<Vec<Vec<EdgePosition>>, GraphError> {
    let mut pairs: Vec<Vec<Option<EdgePosition>>> =
        edges.iter().map(|list| vec![None; list.len()]).collect();
    for (node, list) in edges.iter().enumerate() {
        for (position, init) in list.iter().enumerate() {
            if pairs[node][position].is_some() {
                continue;
            }
            let target = init.target;
            let candidates = || {
                edges[target]
                    .iter()
                    .enumerate()
                    .filter(|(index, other)| {
                        other.target == node && (target != node || *index > position)
                    })
                    .map(|(index, _)| index)
            };
            let found = candidates()
                .find(|&index| pairs[target][index].is_none() && edges[target][index].weight == init.weight);
            match found {
                Some(index) => {
                    pairs[node][position] = Some(EdgePosition::new(target, index));
                    pairs[target][index] = Some(EdgePosition::new(node, position));
                }
                None if target == node => {
                    let loops = list.iter().filter(|other| other.target == node).count();
                    return Err(if loops % 2 == 1 {
                        GraphError::OddLoops { node }
                    } else {
                        GraphError::MismatchedWeights { node, position }
                    });
                }
                None => {
                    let unpaired = candidates().any(|index| pairs[target][index].is_none());
                    return Err(if unpaired {
                        GraphError::MismatchedWeights { node, position }
                    } else {
                        GraphError::AbsentReciprocal { node, target }
                    });
                }
            }
        }
    }
    Ok(pairs
        .into_iter()
        .map(|row| row.into_iter().flatten().collect())
        .collect())
}

impl<F, W, St, Sh> Clone for Connectivity<F, W, St, Sh>
where
    F: Flavour,
    W: Clone,
    St: StorageSelector,
    Sh: WeightSharing,
{
    /// Deep copy.  Shared pairs in `self` become fresh shared pairs in the copy.
    fn clone(&self) -> Self {
        let mut copy = Self::with_order(self.order());
        copy.storage.reserve(self.storage.len());
        let mut pending: HashMap<usize, EdgePosition> = HashMap::new();
        for node in 0..self.order() {
            for (index, edge) in self.storage.partition(node).iter().enumerate() {
                let earlier = edge
                    .handle()
                    .share_key()
                    .and_then(|key| match pending.remove(&key) {
                        Some(mirror) => Some(mirror),
                        None => {
                            pending.insert(key, EdgePosition::new(node, index));
                            None
                        }
                    });
                let handle = match earlier {
                    Some(mirror) => copy.storage.partition(mirror.node)[mirror.index]
                        .handle()
                        .mirror(),
                    None => edge.handle().duplicate(),
                };
                let record = Edge::build(
                    edge.source().unwrap_or(node),
                    edge.target(),
                    edge.complementary_index().unwrap_or(0),
                    handle,
                );
                copy.storage.push_to_partition(node, record);
            }
        }
        copy
    }
}

impl<F, W, St, Sh> PartialEq for Connectivity<F, W, St, Sh>
where
    F: Flavour,
    St: StorageSelector,
    Sh: WeightSharing,
    EdgeRecord<F, W, Sh>: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.order() == other.order()
            && (0..self.order()).all(|n| self.storage.partition(n) == other.storage.partition(n))
    }
}

impl<F, W, St, Sh> Debug for Connectivity<F, W, St, Sh>
where
    F: Flavour,
    St: StorageSelector,
    Sh: WeightSharing,
    EdgeRecord<F, W, Sh>: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries((0..self.order()).map(|n| self.storage.partition(n)))
            .finish()
    }
}
