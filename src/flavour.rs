use crate::{
    edge::{Edge, EmbeddedEdge, EmbeddedPartialEdge, PartialEdge},
    weight::WeightSharing,
};

/// Marker type for directed graphs: one record per edge, in the source's partition.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Directed;

/// Marker type for undirected graphs: mirrored records in both end points' partitions.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Undirected;

/// Marker type for directed graphs whose partitions encode an ordering of
/// both incoming and outgoing edges around each node.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DirectedEmbedded;

/// Marker type for undirected graphs whose partitions encode a rotation system.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct UndirectedEmbedded;

/// Trait defining how a graph flavour lays out its edge records.
///
/// This trait is implemented by the four flavour marker types to provide
/// compile-time specialization of the connectivity engine.
pub trait Flavour: 'static {
    type Edge<W, S: WeightSharing>: Edge<Weight = W, Handle = S::Handle<W>>;

    /// Edges have a direction.
    const DIRECTED: bool;

    /// Records carry complementary indices.
    const EMBEDDED: bool;

    /// Every edge is stored as a pair of records.
    const MIRRORED: bool = !Self::DIRECTED || Self::EMBEDDED;
}

impl Flavour for Directed {
    type Edge<W, S: WeightSharing> = PartialEdge<W, S>;
    const DIRECTED: bool = true;
    const EMBEDDED: bool = false;
}

impl Flavour for Undirected {
    type Edge<W, S: WeightSharing> = PartialEdge<W, S>;
    const DIRECTED: bool = false;
    const EMBEDDED: bool = false;
}

impl Flavour for DirectedEmbedded {
    type Edge<W, S: WeightSharing> = EmbeddedEdge<W, S>;
    const DIRECTED: bool = true;
    const EMBEDDED: bool = true;
}

impl Flavour for UndirectedEmbedded {
    type Edge<W, S: WeightSharing> = EmbeddedPartialEdge<W, S>;
    const DIRECTED: bool = false;
    const EMBEDDED: bool = true;
}
