//! # readcov-core
//!
//! Shared building blocks for `readcov`: the [`Read`](models::Read) and
//! [`Locus`](models::Locus) models, the error types, and helpers for reading
//! delimited read/locus files (plain or gzipped) and writing annotated loci.
//!
//! The overlap counting itself lives in `readcov-segtree`.
pub mod errors;
pub mod models;
pub mod utils;

pub mod consts {
    pub const START_COLUMN: &str = "start";
    pub const LENGTH_COLUMN: &str = "length";
    pub const POSITION_COLUMN: &str = "position";
    pub const COVERAGE_COLUMN: &str = "coverage";
    pub const DELIMITER: u8 = b',';
}
