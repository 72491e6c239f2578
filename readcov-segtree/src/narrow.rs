use num_traits::{PrimInt, Unsigned};

use readcov_core::models::Read;

/// Keep only the reads that cover at least one of `loci`.
///
/// This is an opt-in preprocessing step for when the query positions are known
/// before the index is built. It works on a copy: `reads` is left untouched, and
/// the coverage at every position in `loci` is the same whether the index is
/// built from the narrowed reads or from all of them. Coverage anywhere else is
/// not preserved, so an index built from narrowed reads should not be saved for
/// other loci.
///
/// Malformed reads are passed through so that the load policy sees them either way.
///
/// ```
/// use readcov_core::models::Read;
/// use readcov_segtree::narrow_to_loci;
///
/// let reads = vec![Read::new(1u32, 3), Read::new(100, 10), Read::new(5, 1)];
/// let narrowed = narrow_to_loci(&reads, &[2, 5]);
/// assert_eq!(narrowed, vec![Read::new(1, 3), Read::new(5, 1)]);
/// ```
pub fn narrow_to_loci<I>(reads: &[Read<I>], loci: &[I]) -> Vec<Read<I>>
where
    I: PrimInt + Unsigned + Send + Sync,
{
    let mut sorted = loci.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let kept: Vec<Read<I>> = reads
        .iter()
        .filter(|read| match read.end() {
            Some(end) if read.length > I::zero() => {
                let k = sorted.partition_point(|&p| p < read.start);
                k < sorted.len() && sorted[k] < end
            }
            _ => true,
        })
        .copied()
        .collect();

    log::info!(
        "narrowed {} reads to {} covering {} loci",
        reads.len(),
        kept.len(),
        sorted.len()
    );

    kept
}
