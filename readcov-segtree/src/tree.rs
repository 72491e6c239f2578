//! The heap-encoded segment tree.
//!
//! A tree over `n` leaves is a flat array of `2n - 1` counters. Node `0` is the
//! root, node `i` has children `2i + 1` and `2i + 2`, and the leaves occupy the
//! last `n` indices, leaf slot `s` sitting at `n - 1 + s`. There are no node
//! objects and no pointers, only index arithmetic.
//!
//! The tree has two phases. A [`SegmentTreeBuilder`] is the only type whose
//! counters can change, and only the loader increments them. [`SegmentTreeBuilder::freeze`]
//! turns it into a [`SegmentTree`], which is immutable and can be queried from
//! any number of threads at once.

use crate::errors::{Result, SegTreeError};

/// Heap index of the parent of `i`. The root has no parent.
#[inline]
pub fn parent(i: usize) -> Option<usize> {
    if i == 0 { None } else { Some((i - 1) / 2) }
}

#[inline]
pub fn left_child(i: usize) -> usize {
    2 * i + 1
}

#[inline]
pub fn right_child(i: usize) -> usize {
    2 * i + 2
}

/// Heap index of leaf `slot` in a tree with `leaves` leaves.
#[inline]
pub fn leaf_index(leaves: usize, slot: usize) -> usize {
    leaves - 1 + slot
}

/// Number of counters needed for a tree with `leaves` leaves.
#[inline]
pub fn node_count(leaves: usize) -> usize {
    2 * leaves - 1
}

/// The mutable phase of the tree. Counters start at zero and only go up.
#[derive(Debug, Clone)]
pub struct SegmentTreeBuilder {
    leaves: usize,
    counters: Vec<u32>,
}

impl SegmentTreeBuilder {
    /// Allocate a zeroed tree with `leaves` leaves.
    ///
    /// Fails with [`SegTreeError::InvalidSize`] when `leaves == 0`.
    pub fn new(leaves: usize) -> Result<Self> {
        if leaves == 0 {
            return Err(SegTreeError::InvalidSize(leaves));
        }
        Ok(SegmentTreeBuilder {
            leaves,
            counters: vec![0; node_count(leaves)],
        })
    }

    pub fn leaves(&self) -> usize {
        self.leaves
    }

    /// Add one to the counter of `heap_index`.
    #[inline]
    pub(crate) fn increment_node(&mut self, heap_index: usize) -> Result<()> {
        let counter = &mut self.counters[heap_index];
        *counter = counter
            .checked_add(1)
            .ok_or(SegTreeError::CounterOverflow(heap_index))?;
        Ok(())
    }

    /// Finish the build pass. The returned tree can no longer be modified.
    ///
    /// Fails with [`SegTreeError::CounterOverflow`] if some leaf-to-root sum does
    /// not fit in a `u32`.
    pub fn freeze(self) -> Result<SegmentTree> {
        check_path_sums(&self.counters)?;
        Ok(SegmentTree {
            leaves: self.leaves,
            counters: self.counters.into_boxed_slice(),
        })
    }
}

/// Every leaf-to-root sum must fit in a `u32` so that [`SegmentTree::query`]
/// cannot overflow. Parents come before children, so one forward pass suffices.
fn check_path_sums(counters: &[u32]) -> Result<()> {
    let mut sums: Vec<u32> = Vec::with_capacity(counters.len());
    for (i, &count) in counters.iter().enumerate() {
        let above = parent(i).map_or(0, |p| sums[p]);
        let sum = above
            .checked_add(count)
            .ok_or(SegTreeError::CounterOverflow(i))?;
        sums.push(sum);
    }
    Ok(())
}

/// The frozen phase of the tree, answering stabbing queries in `O(log n)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentTree {
    leaves: usize,
    counters: Box<[u32]>,
}

impl SegmentTree {
    /// Rebuild a frozen tree from a counter array, e.g. one read back from a snapshot.
    pub(crate) fn from_counters(leaves: usize, counters: Vec<u32>) -> Result<Self> {
        if leaves == 0 {
            return Err(SegTreeError::InvalidSize(leaves));
        }
        if counters.len() != node_count(leaves) {
            return Err(SegTreeError::SnapshotDecode(format!(
                "expected {} counters for {} leaves, found {}",
                node_count(leaves),
                leaves,
                counters.len()
            )));
        }
        check_path_sums(&counters).map_err(|e| SegTreeError::SnapshotDecode(e.to_string()))?;
        Ok(SegmentTree {
            leaves,
            counters: counters.into_boxed_slice(),
        })
    }

    pub fn leaves(&self) -> usize {
        self.leaves
    }

    /// The raw counter array, indexed by heap index.
    pub fn counters(&self) -> &[u32] {
        &self.counters
    }

    /// Sum of the counters from leaf `slot` up to and including the root.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= self.leaves()`.
    #[inline]
    pub fn query(&self, slot: usize) -> u32 {
        assert!(
            slot < self.leaves,
            "leaf slot {} out of range for a tree with {} leaves",
            slot,
            self.leaves
        );

        // path sums were checked to fit when the tree was frozen or decoded
        let mut node = leaf_index(self.leaves, slot);
        let mut count = self.counters[node];
        while let Some(p) = parent(node) {
            node = p;
            count += self.counters[node];
        }
        count
    }
}
