//! Read coverage by stabbing queries over a heap-encoded segment tree.
//!
//! Given many reads (half-open ranges `[start, start + length)`) and a set of query
//! positions, this crate answers "how many reads cover this position?" in
//! `O(log n)` per position, after an `O(N log n)` build pass over the `N` reads,
//! where `n` is the number of distinct read boundaries.
//!
//! ## How it works
//!
//! - A [`CoordinateIndex`] collects and deduplicates every read boundary.
//! - A [`SegmentTree`] with one leaf per boundary is stored as a flat array of
//!   `2n - 1` counters using heap arithmetic.
//! - The [loader](loader) splits each read into the canonical set of subtrees that
//!   exactly tile its slot range and increments each of them once.
//! - A query walks from the leaf of a position up to the root, summing counters.
//!
//! Building a big index is the slow part, so a built index can be saved as a
//! [`Snapshot`] and loaded again in a later session.
//!
//! ## Quick Start
//!
//! ```rust
//! use readcov_core::models::Read;
//! use readcov_segtree::{BuildOptions, StabIndex};
//!
//! // three reads: [1, 4), [2, 4) and [5, 6)
//! let reads = vec![Read::new(1u32, 3), Read::new(2, 2), Read::new(5, 1)];
//!
//! let (index, _summary) = StabIndex::build(&reads, &BuildOptions::default()).unwrap();
//!
//! assert_eq!(index.coverage(2), 2);
//! assert_eq!(index.coverage(5), 1);
//! assert_eq!(index.coverage(4), 0); // ends are exclusive
//! assert_eq!(index.coverage(0), 0);
//! ```
//!
//! ## Snapshots
//!
//! ```rust
//! use readcov_core::models::Read;
//! use readcov_segtree::{BuildOptions, Snapshot, StabIndex};
//!
//! let reads = vec![Read::new(10u32, 5); 1000];
//! let (index, _) = StabIndex::build(&reads, &BuildOptions::default()).unwrap();
//!
//! let bytes = index.to_snapshot().encode().unwrap();
//! let restored = StabIndex::from_snapshot(Snapshot::<u32>::decode(&bytes).unwrap());
//!
//! assert_eq!(restored.coverage(12), 1000);
//! ```

/// Build configuration and the malformed-read policy.
pub mod config;

/// The sorted set of distinct read boundaries.
///
/// See [`CoordinateIndex`] for details.
pub mod coordinates;

pub mod errors;

/// The build-then-freeze facade.
///
/// See [`StabIndex`] for details.
pub mod index;

/// Canonical decomposition and the build pass.
pub mod loader;

/// Optional narrowing of reads to a known set of loci.
pub mod narrow;

/// Persisting a built index.
pub mod snapshot;

pub mod tree;

// re-exports
pub use self::config::{BuildConfig, BuildOptions, LoadPolicy};
pub use self::coordinates::CoordinateIndex;
pub use self::errors::{Result, SegTreeError};
pub use self::index::StabIndex;
pub use self::loader::{CanonicalCover, LoadSummary, ReadLoader};
pub use self::narrow::narrow_to_loci;
pub use self::snapshot::Snapshot;
pub use self::tree::{SegmentTree, SegmentTreeBuilder};

/// Constants used throughout the crate.
pub mod consts {
    pub const BUILD_CMD: &str = "build";
    pub const QUERY_CMD: &str = "query";
}
