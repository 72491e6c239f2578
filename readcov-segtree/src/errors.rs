use thiserror::Error;

#[derive(Error, Debug)]
pub enum SegTreeError {
    #[error("Cannot build an index from zero reads")]
    EmptyInput,

    #[error("Cannot allocate a segment tree with {0} leaves")]
    InvalidSize(usize),

    #[error("Malformed read #{index}: start={start}, length={length}")]
    MalformedRead {
        index: usize,
        start: String,
        length: String,
    },

    #[error("Coverage counter overflow at heap node {0}")]
    CounterOverflow(usize),

    #[error("Failed to encode snapshot: {0}")]
    SnapshotEncode(String),

    #[error("Snapshot is corrupt or truncated: {0}")]
    SnapshotDecode(String),

    #[error("Not a readcov snapshot ({0}). Please regenerate it with `readcov build`")]
    SnapshotFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SegTreeError>;
