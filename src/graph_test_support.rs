use std::{collections::HashMap, fmt::Debug};

use quickcheck::{Arbitrary, Gen};

use crate::{
    Connectivity, Edge, EdgeInit, EdgePosition, Flavour, GraphError, StorageSelector,
    WeightHandle, WeightSharing,
    tracing_support::{TimingScope, init_tracing, set_timing_scope, trace_span},
};

/// One record as `(source, target, complementary index, weight)`.
pub type Slot<W> = (usize, usize, Option<usize>, W);

/// The records of every partition, in order.
pub fn layout<F, W, St, Sh>(connectivity: &Connectivity<F, W, St, Sh>) -> Vec<Vec<Slot<W>>>
where
    F: Flavour,
    W: Clone,
    St: StorageSelector,
    Sh: WeightSharing,
{
    (0..connectivity.order())
        .map(|node| {
            connectivity
                .edges(node)
                .unwrap()
                .map(|edge| {
                    (
                        edge.source(),
                        edge.target(),
                        edge.complementary_index(),
                        W::clone(&edge.weight()),
                    )
                })
                .collect()
        })
        .collect()
}

/// `(target, complementary index)` pairs, the usual way of writing down an
/// undirected embedded graph.
pub fn embedding<F, W, St, Sh>(connectivity: &Connectivity<F, W, St, Sh>) -> Vec<Vec<(usize, usize)>>
where
    F: Flavour,
    St: StorageSelector,
    Sh: WeightSharing,
{
    (0..connectivity.order())
        .map(|node| {
            connectivity
                .edges(node)
                .unwrap()
                .map(|edge| (edge.target(), edge.complementary_index().unwrap_or(usize::MAX)))
                .collect()
        })
        .collect()
}

/// Checks every structural invariant of `connectivity`, panicking on the
/// first violation.
pub fn check_connectivity_consistency<F, W, St, Sh>(connectivity: &Connectivity<F, W, St, Sh>)
where
    F: Flavour,
    W: Clone + PartialEq + Debug,
    St: StorageSelector,
    Sh: WeightSharing,
{
    let _scope = set_timing_scope(TimingScope::Consistency);
    init_tracing();
    let _span = trace_span!("check_connectivity_consistency").entered();

    let order = connectivity.order();
    let mut records = 0;
    let mut holders: HashMap<usize, Vec<EdgePosition>> = HashMap::new();
    for node in 0..order {
        for edge in connectivity.edges(node).unwrap() {
            records += 1;
            let here = edge.position();
            assert!(edge.target() < order, "dangling target at {here:?}");
            assert!(edge.source() < order, "dangling source at {here:?}");
            assert_eq!(edge.complementary_index().is_some(), F::EMBEDDED);
            if F::EMBEDDED {
                assert!(
                    edge.source() == node || edge.target() == node,
                    "foreign record at {here:?}"
                );
                let mirror_pos = EdgePosition::new(
                    edge.partner(),
                    edge.complementary_index().unwrap(),
                );
                assert_ne!(mirror_pos, here, "self-referential record");
                let mirror = connectivity.edge(mirror_pos).unwrap();
                assert_eq!(
                    mirror.complementary_index(),
                    Some(here.index),
                    "mirror of {here:?} does not point back"
                );
                assert_eq!(mirror.partner(), node);
                if F::DIRECTED {
                    assert_eq!(
                        (mirror.source(), mirror.target()),
                        (edge.source(), edge.target())
                    );
                }
                assert_eq!(*mirror.weight(), *edge.weight());
                if Sh::is_shared() {
                    assert!(mirror.record().handle().aliases(edge.record().handle()));
                }
            }
            if let Some(key) = edge.record().handle().share_key() {
                holders.entry(key).or_default().push(here);
            }
        }
    }
    assert_eq!(
        connectivity.size(),
        if F::MIRRORED { records / 2 } else { records }
    );

    if Sh::is_shared() && F::MIRRORED {
        for positions in holders.values() {
            assert_eq!(positions.len(), 2, "shared weight held by {positions:?}");
            let a = connectivity.edge(positions[0]).unwrap();
            let b = connectivity.edge(positions[1]).unwrap();
            assert_eq!(a.partner(), b.partition_index());
            assert_eq!(b.partner(), a.partition_index());
        }
    }

    // A consistent value is exactly what the initializer accepts.
    let rebuilt = Connectivity::<F, W, St, Sh>::from_edges(initializer(connectivity));
    assert_eq!(rebuilt.as_ref().err(), None);
}

/// Turns `connectivity` back into an initializer.
pub fn initializer<F, W, St, Sh>(connectivity: &Connectivity<F, W, St, Sh>) -> Vec<Vec<EdgeInit<W>>>
where
    F: Flavour,
    W: Clone,
    St: StorageSelector,
    Sh: WeightSharing,
{
    layout(connectivity)
        .into_iter()
        .map(|slots| {
            slots
                .into_iter()
                .map(|(source, target, index, weight)| {
                    EdgeInit::full(source, target, index.unwrap_or(0), weight)
                })
                .collect()
        })
        .collect()
}

/// A mutation with possibly out-of-range arguments.
#[derive(Clone, Debug)]
pub enum Op {
    AddNode,
    InsertNode(usize),
    Join(usize, usize, u8),
    InsertJoin(EdgePosition, EdgePosition, u8),
    InsertLoop(EdgePosition, usize, u8),
    EraseEdge(EdgePosition),
    SwapEdges(usize, usize, usize),
    SwapNodes(usize, usize),
    EraseNode(usize),
    SortEdges(usize),
    SetEdgeWeight(EdgePosition, u8),
}

const MAX_INDEX: usize = 6;

fn small(g: &mut Gen) -> usize {
    usize::arbitrary(g) % MAX_INDEX
}

fn position(g: &mut Gen) -> EdgePosition {
    EdgePosition::new(small(g), small(g))
}

impl Arbitrary for Op {
    fn arbitrary(g: &mut Gen) -> Self {
        // Joins are weighted up so graphs grow.
        match u8::arbitrary(g) % 14 {
            0 => Op::AddNode,
            1 => Op::InsertNode(small(g)),
            2..=4 => Op::Join(small(g), small(g), u8::arbitrary(g) % 4),
            5 | 6 => Op::InsertJoin(position(g), position(g), u8::arbitrary(g) % 4),
            7 => Op::InsertLoop(position(g), small(g), u8::arbitrary(g) % 4),
            8 => Op::EraseEdge(position(g)),
            9 => Op::SwapEdges(small(g), small(g), small(g)),
            10 => Op::SwapNodes(small(g), small(g)),
            11 => Op::EraseNode(small(g)),
            12 => Op::SortEdges(small(g)),
            _ => Op::SetEdgeWeight(position(g), u8::arbitrary(g)),
        }
    }
}

impl Op {
    pub fn apply<F, St, Sh>(&self, connectivity: &mut Connectivity<F, u8, St, Sh>) -> Result<(), GraphError>
    where
        F: Flavour,
        St: StorageSelector,
        Sh: WeightSharing,
    {
        match *self {
            Op::AddNode => {
                connectivity.add_node();
            }
            Op::InsertNode(pos) => {
                connectivity.insert_node(pos);
            }
            Op::Join(u, v, w) => {
                connectivity.join(u, v, w)?;
            }
            Op::InsertJoin(first, second, w) => {
                connectivity.insert_join(first, second, w)?;
            }
            Op::InsertLoop(at, second, w) => {
                connectivity.insert_loop(at, second, w)?;
            }
            Op::EraseEdge(pos) => connectivity.erase_edge(pos)?,
            Op::SwapEdges(node, i, j) => connectivity.swap_edges(node, i, j)?,
            Op::SwapNodes(i, j) => connectivity.swap_nodes(i, j)?,
            Op::EraseNode(node) => connectivity.erase_node(node)?,
            Op::SortEdges(node) => {
                connectivity.sort_edges(node, .., |a, b| a.target().cmp(&b.target()))?
            }
            Op::SetEdgeWeight(pos, w) => {
                connectivity.set_edge_weight(pos, w)?;
            }
        }
        Ok(())
    }
}

/// Builds a connectivity value by applying `ops` to three isolated nodes,
/// ignoring failed operations.
pub fn build<F, St, Sh>(ops: &[Op]) -> Connectivity<F, u8, St, Sh>
where
    F: Flavour,
    St: StorageSelector,
    Sh: WeightSharing,
{
    let mut connectivity = Connectivity::with_order(3);
    for op in ops {
        let _ = op.apply(&mut connectivity);
    }
    connectivity
}

/// The records of each partition as sorted `(target, weight)` pairs.
pub fn multisets<F, St, Sh>(connectivity: &Connectivity<F, u8, St, Sh>) -> Vec<Vec<(usize, u8)>>
where
    F: Flavour,
    St: StorageSelector,
    Sh: WeightSharing,
{
    layout(connectivity)
        .into_iter()
        .map(|slots| {
            let mut pairs: Vec<_> = slots.into_iter().map(|(_, t, _, w)| (t, w)).collect();
            pairs.sort();
            pairs
        })
        .collect()
}

/// Every record position of `connectivity`.
pub fn positions<F, W, St, Sh>(connectivity: &Connectivity<F, W, St, Sh>) -> Vec<EdgePosition>
where
    F: Flavour,
    St: StorageSelector,
    Sh: WeightSharing,
{
    (0..connectivity.order())
        .flat_map(|node| connectivity.edges(node).unwrap().map(|edge| edge.position()))
        .collect()
}
