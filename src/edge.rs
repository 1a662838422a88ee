//! Edge records: the per-slot data held in a node's partition.

use std::fmt::Debug;

use derivative::Derivative;

use crate::weight::{WeightHandle, WeightSharing};

/// Common interface of the edge record types.
///
/// A record lives in the partition of its host node.  Which fields a record
/// actually stores depends on the flavour; accessors for fields a record type
/// lacks return `None` and setters for them do nothing.
pub trait Edge: Sized {
    type Weight;
    type Handle: WeightHandle<Self::Weight>;

    /// Builds a record.  Fields the record type does not store are ignored.
    fn build(source: usize, target: usize, complementary_index: usize, weight: Self::Handle)
    -> Self;

    /// Builds the record held by the far end point of an edge from `source`
    /// to `target`.  Records that only store a target point back at `source`.
    fn build_mirror(
        source: usize,
        target: usize,
        complementary_index: usize,
        weight: Self::Handle,
    ) -> Self {
        Self::build(target, source, complementary_index, weight)
    }

    fn target(&self) -> usize;

    fn set_target(&mut self, target: usize);

    fn source(&self) -> Option<usize> {
        None
    }

    fn set_source(&mut self, _source: usize) {}

    /// Position of the mirror record within the partner's partition.
    fn complementary_index(&self) -> Option<usize> {
        None
    }

    fn set_complementary_index(&mut self, _index: usize) {}

    fn handle(&self) -> &Self::Handle;

    fn handle_mut(&mut self) -> &mut Self::Handle;

    fn weight(&self) -> <Self::Handle as WeightHandle<Self::Weight>>::Ref<'_> {
        self.handle().get()
    }

    /// The node at the other end of the edge, seen from the partition of `host`.
    fn partner(&self, host: usize) -> usize {
        match self.source() {
            Some(source) if self.target() == host => source,
            _ => self.target(),
        }
    }

    /// Rewrites every node index stored in the record.
    fn relabel(&mut self, f: impl Fn(usize) -> usize) {
        self.set_target(f(self.target()));
        if let Some(source) = self.source() {
            self.set_source(f(source));
        }
    }
}

/// A record holding a target and a weight.  Used by the non-embedded flavours.
#[derive(Derivative)]
#[derivative(
    Clone(bound = "S::Handle<W>: Clone"),
    Debug(bound = "S::Handle<W>: Debug"),
    PartialEq(bound = "S::Handle<W>: PartialEq")
)]
pub struct PartialEdge<W, S: WeightSharing> {
    target: usize,
    weight: S::Handle<W>,
}

/// A partial edge that also records where its mirror sits.  Used by the
/// undirected embedded flavour.
#[derive(Derivative)]
#[derivative(
    Clone(bound = "S::Handle<W>: Clone"),
    Debug(bound = "S::Handle<W>: Debug"),
    PartialEq(bound = "S::Handle<W>: PartialEq")
)]
pub struct EmbeddedPartialEdge<W, S: WeightSharing> {
    target: usize,
    complementary_index: usize,
    weight: S::Handle<W>,
}

/// A record of a directed embedded edge.  The same edge is stored in the
/// partition of its source and in the partition of its target.
#[derive(Derivative)]
#[derivative(
    Clone(bound = "S::Handle<W>: Clone"),
    Debug(bound = "S::Handle<W>: Debug"),
    PartialEq(bound = "S::Handle<W>: PartialEq")
)]
pub struct EmbeddedEdge<W, S: WeightSharing> {
    source: usize,
    target: usize,
    complementary_index: usize,
    weight: S::Handle<W>,
}

impl<W, S: WeightSharing> Edge for PartialEdge<W, S> {
    type Weight = W;
    type Handle = S::Handle<W>;

    fn build(_source: usize, target: usize, _index: usize, weight: Self::Handle) -> Self {
        PartialEdge { target, weight }
    }

    fn target(&self) -> usize {
        self.target
    }

    fn set_target(&mut self, target: usize) {
        self.target = target;
    }

    fn handle(&self) -> &Self::Handle {
        &self.weight
    }

    fn handle_mut(&mut self) -> &mut Self::Handle {
        &mut self.weight
    }
}

impl<W, S: WeightSharing> Edge for EmbeddedPartialEdge<W, S> {
    type Weight = W;
    type Handle = S::Handle<W>;

    fn build(_source: usize, target: usize, complementary_index: usize, weight: Self::Handle) -> Self {
        EmbeddedPartialEdge {
            target,
            complementary_index,
            weight,
        }
    }

    fn target(&self) -> usize {
        self.target
    }

    fn set_target(&mut self, target: usize) {
        self.target = target;
    }

    fn complementary_index(&self) -> Option<usize> {
        Some(self.complementary_index)
    }

    fn set_complementary_index(&mut self, index: usize) {
        self.complementary_index = index;
    }

    fn handle(&self) -> &Self::Handle {
        &self.weight
    }

    fn handle_mut(&mut self) -> &mut Self::Handle {
        &mut self.weight
    }
}

impl<W, S: WeightSharing> Edge for EmbeddedEdge<W, S> {
    type Weight = W;
    type Handle = S::Handle<W>;

    fn build(source: usize, target: usize, complementary_index: usize, weight: Self::Handle) -> Self {
        EmbeddedEdge {
            source,
            target,
            complementary_index,
            weight,
        }
    }

    fn build_mirror(
        source: usize,
        target: usize,
        complementary_index: usize,
        weight: Self::Handle,
    ) -> Self {
        Self::build(source, target, complementary_index, weight)
    }

    fn target(&self) -> usize {
        self.target
    }

    fn set_target(&mut self, target: usize) {
        self.target = target;
    }

    fn source(&self) -> Option<usize> {
        Some(self.source)
    }

    fn set_source(&mut self, source: usize) {
        self.source = source;
    }

    fn complementary_index(&self) -> Option<usize> {
        Some(self.complementary_index)
    }

    fn set_complementary_index(&mut self, index: usize) {
        self.complementary_index = index;
    }

    fn handle(&self) -> &Self::Handle {
        &self.weight
    }

    fn handle_mut(&mut self) -> &mut Self::Handle {
        &mut self.weight
    }
}
