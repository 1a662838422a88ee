//! Partitioned edge storage.
//!
//! Every node owns one ordered sequence of edge records, its partition.  Two
//! strategies are provided: [`Contiguous`] keeps all partitions in a single
//! buffer, [`Bucketed`] gives each partition its own buffer.  Both behave
//! identically apart from capacity and cost characteristics.

use std::fmt::Debug;

use derivative::Derivative;

use crate::error::GraphError;

/// An ordered sequence of records per partition.
///
/// Partition and position arguments are validated by callers; passing an
/// index out of range panics, except for [`remove_partition`](Self::remove_partition).
pub trait PartitionedStorage<T>: Default {
    fn num_partitions(&self) -> usize;

    /// Total number of records over all partitions.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn partition(&self, n: usize) -> &[T];

    fn partition_mut(&mut self, n: usize) -> &mut [T];

    fn partition_len(&self, n: usize) -> usize {
        self.partition(n).len()
    }

    fn push_to_partition(&mut self, n: usize, value: T) {
        let len = self.partition_len(n);
        self.insert_to_partition(n, len, value);
    }

    fn insert_to_partition(&mut self, n: usize, pos: usize, value: T);

    fn remove_from_partition(&mut self, n: usize, pos: usize) -> T;

    /// Exchanges two records, which may live in different partitions.
    fn swap(&mut self, a: (usize, usize), b: (usize, usize));

    fn add_partition(&mut self) {
        self.insert_partition(self.num_partitions());
    }

    /// Inserts an empty partition so that it gets index `n`.
    fn insert_partition(&mut self, n: usize);

    /// Removes partition `n` with all of its records.
    fn remove_partition(&mut self, n: usize) -> Result<(), GraphError>;

    fn swap_partitions(&mut self, i: usize, j: usize);

    /// Reserves room for `additional` more records.
    fn reserve(&mut self, additional: usize);

    /// Reserves room for `additional` more records in partition `n`.
    fn reserve_partition(&mut self, n: usize, additional: usize);

    fn reserve_partitions(&mut self, additional: usize);

    /// Number of records that fit without reallocating.
    fn capacity(&self) -> usize;

    fn partitions_capacity(&self) -> usize;

    fn shrink_to_fit(&mut self);

    fn clear(&mut self);
}

/// Selects a [`PartitionedStorage`] implementation for a graph type.
pub trait StorageSelector: 'static {
    type Storage<T>: PartitionedStorage<T>;
}

/// Marker type selecting [`ContiguousStorage`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Contiguous;

/// Marker type selecting [`BucketedStorage`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Bucketed;

impl StorageSelector for Contiguous {
    type Storage<T> = ContiguousStorage<T>;
}

impl StorageSelector for Bucketed {
    type Storage<T> = BucketedStorage<T>;
}

// ==================== Contiguous ====================

/// All records in one buffer.  `offsets[n]..offsets[n + 1]` is partition `n`.
#[derive(Derivative)]
#[derivative(
    Clone(bound = "T: Clone"),
    Debug(bound = "T: Debug"),
    PartialEq(bound = "T: PartialEq")
)]
pub struct ContiguousStorage<T> {
    records: Vec<T>,
    offsets: Vec<usize>,
}

impl<T> Default for ContiguousStorage<T> {
    fn default() -> Self {
        ContiguousStorage {
            records: Vec::new(),
            offsets: vec![0],
        }
    }
}

impl<T> ContiguousStorage<T> {
    fn range(&self, n: usize) -> std::ops::Range<usize> {
        self.offsets[n]..self.offsets[n + 1]
    }
}

impl<T> PartitionedStorage<T> for ContiguousStorage<T> {
    fn num_partitions(&self) -> usize {
        self.offsets.len() - 1
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn partition(&self, n: usize) -> &[T] {
        &self.records[self.range(n)]
    }

    fn partition_mut(&mut self, n: usize) -> &mut [T] {
        let range = self.range(n);
        &mut self.records[range]
    }

    fn insert_to_partition(&mut self, n: usize, pos: usize, value: T) {
        let range = self.range(n);
        assert!(pos <= range.len(), "insertion position out of range");
        self.records.insert(range.start + pos, value);
        for offset in &mut self.offsets[n + 1..] {
            *offset += 1;
        }
    }

    fn remove_from_partition(&mut self, n: usize, pos: usize) -> T {
        let range = self.range(n);
        assert!(pos < range.len(), "removal position out of range");
        let value = self.records.remove(range.start + pos);
        for offset in &mut self.offsets[n + 1..] {
            *offset -= 1;
        }
        value
    }

    fn swap(&mut self, a: (usize, usize), b: (usize, usize)) {
        let (ra, rb) = (self.range(a.0), self.range(b.0));
        assert!(a.1 < ra.len() && b.1 < rb.len(), "swap position out of range");
        self.records.swap(ra.start + a.1, rb.start + b.1);
    }

    fn insert_partition(&mut self, n: usize) {
        let start = self.offsets[n];
        self.offsets.insert(n, start);
    }

    fn remove_partition(&mut self, n: usize) -> Result<(), GraphError> {
        let order = self.num_partitions();
        if n >= order {
            return Err(GraphError::NodeOutOfRange {
                operation: "remove_partition",
                node: n,
                order,
            });
        }
        let range = self.range(n);
        let removed = range.len();
        self.records.drain(range);
        for offset in &mut self.offsets[n + 1..] {
            *offset -= removed;
        }
        self.offsets.remove(n + 1);
        Ok(())
    }

    fn swap_partitions(&mut self, i: usize, j: usize) {
        let (i, j) = if i <= j { (i, j) } else { (j, i) };
        if i == j {
            return;
        }
        let (first, second) = (self.range(i), self.range(j));
        let (a, b) = (first.len(), second.len());
        let middle = second.start - first.end;
        // [first, middle, second] -> [second, middle, first]
        let block = &mut self.records[first.start..second.end];
        block.rotate_left(a);
        block[..middle + b].rotate_right(b);
        for offset in &mut self.offsets[i + 1..=j] {
            *offset = *offset + b - a;
        }
    }

    fn reserve(&mut self, additional: usize) {
        self.records.reserve(additional);
    }

    fn reserve_partition(&mut self, _n: usize, additional: usize) {
        self.records.reserve(additional);
    }

    fn reserve_partitions(&mut self, additional: usize) {
        self.offsets.reserve(additional);
    }

    fn capacity(&self) -> usize {
        self.records.capacity()
    }

    fn partitions_capacity(&self) -> usize {
        self.offsets.capacity() - 1
    }

    fn shrink_to_fit(&mut self) {
        self.records.shrink_to_fit();
        self.offsets.shrink_to_fit();
    }

    fn clear(&mut self) {
        self.records.clear();
        self.offsets.clear();
        self.offsets.push(0);
    }
}

// ==================== Bucketed ====================

/// One independently growable buffer per partition.
#[derive(Derivative)]
#[derivative(
    Clone(bound = "T: Clone"),
    Debug(bound = "T: Debug"),
    PartialEq(bound = "T: PartialEq"),
    Default(bound = "")
)]
pub struct BucketedStorage<T> {
    buckets: Vec<Vec<T>>,
}

impl<T> PartitionedStorage<T> for BucketedStorage<T> {
    fn num_partitions(&self) -> usize {
        self.buckets.len()
    }

    fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    fn partition(&self, n: usize) -> &[T] {
        &self.buckets[n]
    }

    fn partition_mut(&mut self, n: usize) -> &mut [T] {
        &mut self.buckets[n]
    }

    fn partition_len(&self, n: usize) -> usize {
        self.buckets[n].len()
    }

    fn push_to_partition(&mut self, n: usize, value: T) {
        self.buckets[n].push(value);
    }

    fn insert_to_partition(&mut self, n: usize, pos: usize, value: T) {
        self.buckets[n].insert(pos, value);
    }

    fn remove_from_partition(&mut self, n: usize, pos: usize) -> T {
        self.buckets[n].remove(pos)
    }

    fn swap(&mut self, a: (usize, usize), b: (usize, usize)) {
        if a.0 == b.0 {
            self.buckets[a.0].swap(a.1, b.1);
            return;
        }
        let (low, high) = if a.0 < b.0 { (a, b) } else { (b, a) };
        let (left, right) = self.buckets.split_at_mut(high.0);
        std::mem::swap(&mut left[low.0][low.1], &mut right[0][high.1]);
    }

    fn insert_partition(&mut self, n: usize) {
        self.buckets.insert(n, Vec::new());
    }

    fn remove_partition(&mut self, n: usize) -> Result<(), GraphError> {
        let order = self.buckets.len();
        if n >= order {
            return Err(GraphError::NodeOutOfRange {
                operation: "remove_partition",
                node: n,
                order,
            });
        }
        self.buckets.remove(n);
        Ok(())
    }

    fn swap_partitions(&mut self, i: usize, j: usize) {
        self.buckets.swap(i, j);
    }

    /// Buckets have no shared buffer, so there is nothing to reserve up front.
    fn reserve(&mut self, _additional: usize) {}

    fn reserve_partition(&mut self, n: usize, additional: usize) {
        self.buckets[n].reserve(additional);
    }

    fn reserve_partitions(&mut self, additional: usize) {
        self.buckets.reserve(additional);
    }

    fn capacity(&self) -> usize {
        self.buckets.iter().map(Vec::capacity).sum()
    }

    fn partitions_capacity(&self) -> usize {
        self.buckets.capacity()
    }

    fn shrink_to_fit(&mut self) {
        for bucket in &mut self.buckets {
            bucket.shrink_to_fit();
        }
        self.buckets.shrink_to_fit();
    }

    fn clear(&mut self) {
        self.buckets.clear();
    }
}
