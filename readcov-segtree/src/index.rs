use std::path::Path;
use std::time::Instant;

use num_traits::{PrimInt, Unsigned};
use rayon::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::BuildOptions;
use crate::coordinates::CoordinateIndex;
use crate::errors::Result;
use crate::loader::{LoadSummary, ReadLoader, validate_reads};
use crate::snapshot::Snapshot;
use crate::tree::SegmentTree;
use readcov_core::models::{Locus, Read};

/// A frozen coverage index: the coordinate index plus the counter tree built over it.
///
/// `StabIndex` is immutable once built and is `Send + Sync`, so queries can run
/// from any number of threads without locking.
///
/// # Examples
///
/// ```
/// use readcov_core::models::Read;
/// use readcov_segtree::{BuildOptions, StabIndex};
///
/// let reads = vec![Read::new(1u32, 3), Read::new(2, 2), Read::new(5, 1)];
/// let (index, summary) = StabIndex::build(&reads, &BuildOptions::default()).unwrap();
///
/// assert_eq!(summary.loaded, 3);
/// assert_eq!(index.coverage(2), 2);
/// assert_eq!(index.coverage(4), 0);
/// assert_eq!(index.coverage_many(&[0, 1, 5]), vec![0, 1, 1]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StabIndex<I>
where
    I: PrimInt + Unsigned + Send + Sync,
{
    coordinates: CoordinateIndex<I>,
    tree: SegmentTree,
}

impl<I> StabIndex<I>
where
    I: PrimInt + Unsigned + Send + Sync,
{
    /// Run the whole build: apply the load policy, derive the coordinate index,
    /// insert every read, and freeze the tree.
    pub fn build(reads: &[Read<I>], options: &BuildOptions) -> Result<(Self, LoadSummary)> {
        let start = Instant::now();
        let (reads, skipped) = validate_reads(reads, options.policy)?;

        let coordinates = CoordinateIndex::build(&reads)?;
        log::info!(
            "indexed {} distinct coordinates from {} reads",
            coordinates.len(),
            reads.len()
        );

        let mut loader = ReadLoader::new(&coordinates)?;
        loader.record_skipped(skipped);
        loader.insert_all(&reads, options.progress)?;
        let (tree, summary) = loader.finish()?;

        log::info!(
            "built segment tree with {} nodes in {:.1}s ({} loaded, {} skipped, {} empty)",
            tree.counters().len(),
            start.elapsed().as_secs_f64(),
            summary.loaded,
            summary.skipped,
            summary.empty
        );

        Ok((StabIndex { coordinates, tree }, summary))
    }

    pub fn coordinates(&self) -> &CoordinateIndex<I> {
        &self.coordinates
    }

    pub fn tree(&self) -> &SegmentTree {
        &self.tree
    }

    /// Number of reads covering `position`.
    ///
    /// Never fails: a position before the first coordinate is covered by nothing,
    /// and a position past the last one falls in the last slot, which no read reaches.
    #[inline]
    pub fn coverage(&self, position: I) -> u32 {
        match self.coordinates.leaf_slot(position) {
            Some(slot) => self.tree.query(slot),
            None => 0,
        }
    }

    /// Coverage for every position, in the same order, computed in parallel.
    pub fn coverage_many(&self, positions: &[I]) -> Vec<u32> {
        positions.par_iter().map(|&p| self.coverage(p)).collect()
    }

    /// Fill in the coverage of every locus.
    pub fn annotate(&self, loci: &mut [Locus<I>]) {
        loci.par_iter_mut()
            .for_each(|locus| locus.coverage = Some(self.coverage(locus.position)));
    }
}

impl<I> StabIndex<I>
where
    I: PrimInt + Unsigned + Send + Sync + Serialize + DeserializeOwned,
{
    pub fn to_snapshot(&self) -> Snapshot<I> {
        Snapshot::capture(&self.coordinates, &self.tree)
    }

    pub fn from_snapshot(snapshot: Snapshot<I>) -> Self {
        let (coordinates, tree) = snapshot.into_parts();
        StabIndex { coordinates, tree }
    }

    pub fn save_bin<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_snapshot().save_bin(path)
    }

    pub fn load_bin<P: AsRef<Path>>(path: P) -> Result<Self> {
        Snapshot::load_bin(path).map(Self::from_snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoadPolicy;
    use crate::errors::SegTreeError;

    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstest::{fixture, rstest};

    fn brute_force(reads: &[Read<u32>], position: u32) -> u32 {
        reads.iter().filter(|r| r.covers(position)).count() as u32
    }

    #[fixture]
    fn reads() -> Vec<Read<u32>> {
        vec![Read::new(1, 3), Read::new(2, 2), Read::new(5, 1)]
    }

    #[rstest]
    #[case(2, 2)]
    #[case(5, 1)]
    #[case(4, 0)]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(3, 2)]
    #[case(6, 0)]
    #[case(1_000_000, 0)]
    fn test_scenario(reads: Vec<Read<u32>>, #[case] position: u32, #[case] expected: u32) {
        let (index, _) = StabIndex::build(&reads, &BuildOptions::default()).unwrap();
        assert_eq!(index.coordinates().points(), &[1, 2, 4, 5, 6]);
        assert_eq!(index.coverage(position), expected);
    }

    #[rstest]
    fn test_identical_reads() {
        let reads = vec![Read::new(10u32, 5); 1000];
        let (index, summary) = StabIndex::build(&reads, &BuildOptions::default()).unwrap();

        assert_eq!(summary.loaded, 1000);
        assert_eq!(index.tree().leaves(), 2);
        for p in 10..15 {
            assert_eq!(index.coverage(p), 1000);
        }
        for p in [0, 9, 15, 16, 10_000] {
            assert_eq!(index.coverage(p), 0);
        }
    }

    #[rstest]
    fn test_matches_brute_force_on_random_reads() {
        let mut rng = StdRng::seed_from_u64(2019);
        for _ in 0..50 {
            let n = rng.random_range(1..200);
            let reads: Vec<Read<u32>> = (0..n)
                .map(|_| Read::new(rng.random_range(0..500), rng.random_range(1..60)))
                .collect();
            let (index, _) = StabIndex::build(&reads, &BuildOptions::default()).unwrap();

            for p in 0..600 {
                assert_eq!(index.coverage(p), brute_force(&reads, p), "position {p}");
            }
        }
    }

    #[rstest]
    fn test_coverage_many_preserves_order(reads: Vec<Read<u32>>) {
        let (index, _) = StabIndex::build(&reads, &BuildOptions::default()).unwrap();
        let positions = vec![5, 0, 2, 4, 3, 2];

        assert_eq!(index.coverage_many(&positions), vec![1, 0, 2, 0, 2, 2]);
    }

    #[rstest]
    fn test_annotate(reads: Vec<Read<u32>>) {
        let (index, _) = StabIndex::build(&reads, &BuildOptions::default()).unwrap();
        let mut loci: Vec<Locus<u32>> = vec![2u32, 4, 5].into_iter().map(Locus::from).collect();
        index.annotate(&mut loci);

        let coverage: Vec<Option<u32>> = loci.iter().map(|l| l.coverage).collect();
        assert_eq!(coverage, vec![Some(2), Some(0), Some(1)]);
    }

    #[rstest]
    fn test_concurrent_readers(reads: Vec<Read<u32>>) {
        let (index, _) = StabIndex::build(&reads, &BuildOptions::default()).unwrap();

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..1_000 {
                        assert_eq!(index.coverage(2), 2);
                        assert_eq!(index.coverage(5), 1);
                    }
                });
            }
        });
    }

    #[rstest]
    fn test_empty_input() {
        let result = StabIndex::<u32>::build(&[], &BuildOptions::default());
        assert_eq!(matches!(result, Err(SegTreeError::EmptyInput)), true);
    }

    #[rstest]
    fn test_strict_policy_fails_fast() {
        let reads = vec![Read::new(1u32, 3), Read::new(2, 0)];
        let result = StabIndex::build(&reads, &BuildOptions::default());
        assert_eq!(
            matches!(result, Err(SegTreeError::MalformedRead { index: 1, .. })),
            true
        );
    }

    #[rstest]
    fn test_skip_policy_drops_malformed_reads() {
        let reads = vec![Read::new(1u32, 3), Read::new(2, 0), Read::new(u32::MAX, 3)];
        let options = BuildOptions {
            policy: LoadPolicy::Skip,
            progress: false,
        };
        let (index, summary) = StabIndex::build(&reads, &options).unwrap();

        assert_eq!(summary.loaded, 1);
        assert_eq!(summary.skipped, 2);
        // malformed boundaries never reach the coordinate index
        assert_eq!(index.coordinates().points(), &[1, 4]);
        assert_eq!(index.coverage(2), 1);
    }

    #[rstest]
    fn test_skip_policy_all_malformed_is_empty_input() {
        let reads = vec![Read::new(2u32, 0)];
        let options = BuildOptions {
            policy: LoadPolicy::Skip,
            progress: false,
        };
        let result = StabIndex::build(&reads, &options);
        assert_eq!(matches!(result, Err(SegTreeError::EmptyInput)), true);
    }

    #[rstest]
    fn test_snapshot_round_trip_matches_every_slot() {
        let mut rng = StdRng::seed_from_u64(11);
        let reads: Vec<Read<u32>> = (0..300)
            .map(|_| Read::new(rng.random_range(0..10_000), rng.random_range(1..500)))
            .collect();
        let (index, _) = StabIndex::build(&reads, &BuildOptions::default()).unwrap();

        let bytes = index.to_snapshot().encode().unwrap();
        let restored = StabIndex::from_snapshot(Snapshot::<u32>::decode(&bytes).unwrap());

        assert_eq!(restored, index);
        for slot in 0..index.tree().leaves() {
            assert_eq!(restored.tree().query(slot), index.tree().query(slot));
        }
        for p in (0..11_000).step_by(37) {
            assert_eq!(restored.coverage(p), index.coverage(p));
        }
    }

    #[rstest]
    fn test_save_and_load_bin(reads: Vec<Read<u32>>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.bin");
        let (index, _) = StabIndex::build(&reads, &BuildOptions::default()).unwrap();

        index.save_bin(&path).unwrap();
        let loaded = StabIndex::<u32>::load_bin(&path).unwrap();

        assert_eq!(loaded.coverage_many(&[0, 2, 4, 5]), vec![0, 2, 0, 1]);
    }

    #[rstest]
    fn test_works_with_u64_coordinates() {
        let reads = vec![Read::new(5_000_000_000u64, 100), Read::new(5_000_000_050, 100)];
        let (index, _) = StabIndex::build(&reads, &BuildOptions::default()).unwrap();

        assert_eq!(index.coverage(5_000_000_075), 2);
        assert_eq!(index.coverage(5_000_000_120), 1);
    }
}
