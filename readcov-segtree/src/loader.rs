use std::borrow::Cow;

use indicatif::{ProgressBar, ProgressStyle};
use num_traits::{PrimInt, Unsigned};

use crate::config::LoadPolicy;
use crate::coordinates::{CoordinateIndex, malformed};
use crate::errors::Result;
use crate::tree::{SegmentTree, SegmentTreeBuilder};
use readcov_core::models::Read;

/// Counts gathered over one loader pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    /// Reads whose canonical nodes were incremented.
    pub loaded: usize,
    /// Malformed reads dropped under [`LoadPolicy::Skip`].
    pub skipped: usize,
    /// Valid reads that covered no recorded coordinate.
    pub empty: usize,
}

/// Reusable scratch space for the canonical decomposition of a slot range.
///
/// One buffer is kept across all inserts of a build, so the pass does not
/// allocate per read.
#[derive(Debug, Default)]
pub struct CanonicalCover {
    nodes: Vec<usize>,
}

impl CanonicalCover {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(cap),
        }
    }

    /// Decompose the inclusive slot range `[lo, hi]` of a tree with `leaves`
    /// leaves into the heap indices of the subtrees that exactly tile it.
    ///
    /// The two ends walk up in lockstep. A left end that is a right child is
    /// taken and steps right before climbing; a right end that is a left child
    /// is taken and steps left. The walk stops when the ends cross. At most two
    /// nodes are taken per level, and no taken node is an ancestor of another.
    pub fn decompose(&mut self, leaves: usize, lo: usize, hi: usize) -> &[usize] {
        debug_assert!(lo <= hi && hi < leaves);
        self.nodes.clear();

        // 1-based positions: root is 1, children of j are 2j and 2j + 1,
        // so a right child is odd and a left child is even.
        let mut l = lo + leaves;
        let mut r = hi + leaves;
        while l <= r {
            if l % 2 == 1 {
                self.nodes.push(l - 1);
                l += 1;
            }
            if r % 2 == 0 {
                self.nodes.push(r - 1);
                r -= 1;
            }
            l /= 2;
            r /= 2;
        }

        &self.nodes
    }
}

/// Increment every canonical node of `read` in `builder`.
///
/// Returns the number of nodes incremented, `0` when the read covers no
/// recorded coordinate. A read without a representable end contributes nothing;
/// such reads are expected to be filtered out by [`validate_reads`] first.
///
/// Fails with [`SegTreeError::CounterOverflow`](crate::errors::SegTreeError::CounterOverflow)
/// when a counter is already at `u32::MAX`.
pub fn insert<I>(
    builder: &mut SegmentTreeBuilder,
    index: &CoordinateIndex<I>,
    read: &Read<I>,
    cover: &mut CanonicalCover,
) -> Result<usize>
where
    I: PrimInt + Unsigned + Send + Sync,
{
    let Some(end) = read.end() else {
        return Ok(0);
    };
    let Some((lo, hi)) = index.slot_range(read.start, end) else {
        return Ok(0);
    };

    let nodes = cover.decompose(builder.leaves(), lo, hi);
    for &node in nodes {
        builder.increment_node(node)?;
    }
    Ok(nodes.len())
}

/// Apply `policy` to `reads` before anything is built from them.
///
/// Under [`LoadPolicy::Strict`] the first malformed read is an error. Under
/// [`LoadPolicy::Skip`] malformed reads are dropped and counted. The input is
/// only copied when something actually has to be dropped.
pub fn validate_reads<I>(reads: &[Read<I>], policy: LoadPolicy) -> Result<(Cow<'_, [Read<I>]>, usize)>
where
    I: PrimInt + Unsigned + Send + Sync,
{
    let first_bad = reads.iter().position(|r| !r.is_valid());
    let Some(first_bad) = first_bad else {
        return Ok((Cow::Borrowed(reads), 0));
    };

    match policy {
        LoadPolicy::Strict => Err(malformed(first_bad, &reads[first_bad])),
        LoadPolicy::Skip => {
            let mut kept = Vec::with_capacity(reads.len());
            let mut skipped = 0;
            for (i, read) in reads.iter().enumerate() {
                if read.is_valid() {
                    kept.push(*read);
                } else {
                    log::debug!("skipping malformed read #{}", i);
                    skipped += 1;
                }
            }
            log::warn!("skipped {} malformed read(s) out of {}", skipped, reads.len());
            Ok((Cow::Owned(kept), skipped))
        }
    }
}

fn progress_bar(len: usize, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    bar.set_message("inserting reads");
    bar
}

/// Drives the build pass: owns the builder and the scratch cover, inserts reads
/// one at a time, and hands back the frozen tree.
#[derive(Debug)]
pub struct ReadLoader<'a, I>
where
    I: PrimInt + Unsigned + Send + Sync,
{
    index: &'a CoordinateIndex<I>,
    builder: SegmentTreeBuilder,
    cover: CanonicalCover,
    summary: LoadSummary,
}

impl<'a, I> ReadLoader<'a, I>
where
    I: PrimInt + Unsigned + Send + Sync,
{
    pub fn new(index: &'a CoordinateIndex<I>) -> Result<Self> {
        let builder = SegmentTreeBuilder::new(index.len())?;
        // two nodes per level at most
        let depth = usize::BITS - index.len().leading_zeros();
        Ok(ReadLoader {
            index,
            builder,
            cover: CanonicalCover::with_capacity(2 * depth as usize),
            summary: LoadSummary::default(),
        })
    }

    /// Insert a single read.
    pub fn insert(&mut self, read: &Read<I>) -> Result<()> {
        match insert(&mut self.builder, self.index, read, &mut self.cover)? {
            0 => self.summary.empty += 1,
            _ => self.summary.loaded += 1,
        }
        Ok(())
    }

    /// Insert every read in order, optionally reporting progress.
    pub fn insert_all(&mut self, reads: &[Read<I>], progress: bool) -> Result<()> {
        let bar = progress_bar(reads.len(), progress);
        for (i, read) in reads.iter().enumerate() {
            if let Err(e) = self.insert(read) {
                bar.abandon();
                return Err(e);
            }
            if i % 4096 == 0 {
                bar.set_position(i as u64);
            }
        }
        bar.finish_and_clear();
        Ok(())
    }

    /// Record reads dropped before loading, so they show up in the summary.
    pub fn record_skipped(&mut self, skipped: usize) {
        self.summary.skipped += skipped;
    }

    pub fn summary(&self) -> LoadSummary {
        self.summary
    }

    /// End the build pass.
    pub fn finish(self) -> Result<(SegmentTree, LoadSummary)> {
        Ok((self.builder.freeze()?, self.summary))
    }
}
