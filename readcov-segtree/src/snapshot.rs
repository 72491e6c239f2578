use std::path::Path;
use std::time::Instant;

use bincode::Options;
use num_traits::{PrimInt, Unsigned};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::coordinates::CoordinateIndex;
use crate::errors::{Result, SegTreeError};
use crate::tree::SegmentTree;

pub const SNAPSHOT_MAGIC: [u8; 4] = *b"RCST";
pub const SNAPSHOT_VERSION: u16 = 1;

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
struct SnapshotHeader {
    magic: [u8; 4],
    version: u16,
}

/// On-disk layout: the header, then the points, then the counters.
#[derive(Serialize, Deserialize)]
struct SnapshotFile<I> {
    header: SnapshotHeader,
    points: Vec<I>,
    counters: Vec<u32>,
}

fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
}

/// A built coordinate index and counter array, captured so a later session can
/// skip the build pass.
///
/// A `Snapshot` is always consistent: decoding checks the header, that the
/// points are strictly increasing, and that there are exactly `2n - 1` counters
/// for `n` points. Nothing is returned unless every check passes.
///
/// Nothing records which reads a snapshot was built from. Pairing it with the
/// right loci is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<I>
where
    I: PrimInt + Unsigned + Send + Sync,
{
    index: CoordinateIndex<I>,
    tree: SegmentTree,
}

impl<I> Snapshot<I>
where
    I: PrimInt + Unsigned + Send + Sync + Serialize + DeserializeOwned,
{
    pub fn capture(index: &CoordinateIndex<I>, tree: &SegmentTree) -> Self {
        Snapshot {
            index: index.clone(),
            tree: tree.clone(),
        }
    }

    pub fn into_parts(self) -> (CoordinateIndex<I>, SegmentTree) {
        (self.index, self.tree)
    }

    pub fn index(&self) -> &CoordinateIndex<I> {
        &self.index
    }

    pub fn tree(&self) -> &SegmentTree {
        &self.tree
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let file = SnapshotFile {
            header: SnapshotHeader {
                magic: SNAPSHOT_MAGIC,
                version: SNAPSHOT_VERSION,
            },
            points: self.index.points().to_vec(),
            counters: self.tree.counters().to_vec(),
        };
        wire_options()
            .serialize(&file)
            .map_err(|e| SegTreeError::SnapshotEncode(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let header: SnapshotHeader = wire_options()
            .allow_trailing_bytes()
            .deserialize(bytes)
            .map_err(|_| SegTreeError::SnapshotFormat("file is too short".to_string()))?;
        if header.magic != SNAPSHOT_MAGIC {
            return Err(SegTreeError::SnapshotFormat("bad magic bytes".to_string()));
        }
        if header.version != SNAPSHOT_VERSION {
            return Err(SegTreeError::SnapshotFormat(format!(
                "unsupported version {}, expected {}",
                header.version, SNAPSHOT_VERSION
            )));
        }

        let file: SnapshotFile<I> = wire_options()
            .with_limit(bytes.len() as u64)
            .reject_trailing_bytes()
            .deserialize(bytes)
            .map_err(|e| SegTreeError::SnapshotDecode(e.to_string()))?;

        let leaves = file.points.len();
        let index = CoordinateIndex::from_points(file.points).map_err(|e| match e {
            SegTreeError::EmptyInput => {
                SegTreeError::SnapshotDecode("snapshot holds no points".to_string())
            }
            other => other,
        })?;
        let tree = SegmentTree::from_counters(leaves, file.counters)?;

        Ok(Snapshot { index, tree })
    }

    pub fn save_bin<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let start = Instant::now();
        let bytes = self.encode()?;
        std::fs::write(path.as_ref(), &bytes)?;
        log::info!(
            "wrote snapshot {} ({:.1} MB, {} points) in {:.1}s",
            path.as_ref().display(),
            bytes.len() as f64 / 1_048_576.0,
            self.index.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(())
    }

    pub fn load_bin<P: AsRef<Path>>(path: P) -> Result<Self> {
        let start = Instant::now();
        let bytes = std::fs::read(path.as_ref())?;
        let snapshot = Self::decode(&bytes)?;
        log::info!(
            "loaded snapshot {} ({} points) in {:.1}s",
            path.as_ref().display(),
            snapshot.index.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(snapshot)
    }
}
