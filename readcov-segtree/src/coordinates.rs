use num_traits::{PrimInt, Unsigned};

use crate::errors::{Result, SegTreeError};
use readcov_core::models::Read;

/// The sorted, deduplicated set of read boundaries.
///
/// Every read contributes its `start` and its exclusive `end`. Slot `i` stands for
/// the elementary range `[points[i], points[i + 1])`, and the last slot runs from
/// the largest boundary onwards. Reads sharing a boundary share a slot, so the
/// number of slots is bounded by twice the number of reads but is usually far smaller.
///
/// # Examples
///
/// ```
/// use readcov_core::models::Read;
/// use readcov_segtree::CoordinateIndex;
///
/// let reads = vec![Read::new(1u32, 3), Read::new(2, 2), Read::new(5, 1)];
/// let index = CoordinateIndex::build(&reads).unwrap();
///
/// // boundaries {1, 4}, {2, 4} and {5, 6}
/// assert_eq!(index.points(), &[1, 2, 4, 5, 6]);
/// assert_eq!(index.leaf_slot(2), Some(1));
/// assert_eq!(index.leaf_slot(0), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateIndex<I>
where
    I: PrimInt + Unsigned + Send + Sync,
{
    points: Vec<I>,
}

impl<I> CoordinateIndex<I>
where
    I: PrimInt + Unsigned + Send + Sync,
{
    /// Collect the boundaries of `reads`, then sort and deduplicate them.
    ///
    /// Fails with [`SegTreeError::EmptyInput`] when `reads` is empty, and with
    /// [`SegTreeError::MalformedRead`] when a read has no representable end.
    pub fn build(reads: &[Read<I>]) -> Result<Self> {
        if reads.is_empty() {
            return Err(SegTreeError::EmptyInput);
        }

        let mut points = Vec::with_capacity(reads.len() * 2);
        for (index, read) in reads.iter().enumerate() {
            let end = read.end().ok_or_else(|| malformed(index, read))?;
            points.push(read.start);
            points.push(end);
        }

        points.sort_unstable();
        points.dedup();

        Ok(CoordinateIndex { points })
    }

    /// Rebuild an index from points that were previously produced by [`CoordinateIndex::build`].
    pub(crate) fn from_points(points: Vec<I>) -> Result<Self> {
        if points.is_empty() {
            return Err(SegTreeError::EmptyInput);
        }
        if points.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SegTreeError::SnapshotDecode(
                "coordinate points are not strictly increasing".to_string(),
            ));
        }
        Ok(CoordinateIndex { points })
    }

    /// The distinct boundaries, in ascending order.
    pub fn points(&self) -> &[I] {
        &self.points
    }

    /// Number of slots (leaves of the tree built over this index).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false` for an index that was successfully built.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The slot whose elementary range contains `position`: the index of the
    /// largest point `<= position`.
    ///
    /// Positions past the last point land in the last slot. Positions before the
    /// first point have no slot and return `None`; no read can cover them.
    #[inline]
    pub fn leaf_slot(&self, position: I) -> Option<usize> {
        match self.points.partition_point(|&p| p <= position) {
            0 => None,
            k => Some(k - 1),
        }
    }

    /// The inclusive slot range `[lo, hi]` covered by `[start, end)`.
    ///
    /// `lo` is the first slot whose point is `>= start` and `hi` the last slot whose
    /// point is `< end`. Returns `None` when the range holds no recorded point.
    #[inline]
    pub fn slot_range(&self, start: I, end: I) -> Option<(usize, usize)> {
        let lo = self.points.partition_point(|&p| p < start);
        let hi_exclusive = self.points.partition_point(|&p| p < end);

        if hi_exclusive == 0 || lo >= hi_exclusive {
            None
        } else {
            Some((lo, hi_exclusive - 1))
        }
    }
}

pub(crate) fn malformed<I>(index: usize, read: &Read<I>) -> SegTreeError
where
    I: PrimInt + Unsigned + Send + Sync,
{
    let show = |v: I| v.to_u128().map_or_else(|| "?".to_string(), |v| v.to_string());
    SegTreeError::MalformedRead {
        index,
        start: show(read.start),
        length: show(read.length),
    }
}
