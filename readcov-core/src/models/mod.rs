pub mod locus;
pub mod read;

// re-export for cleaner imports
pub use self::locus::Locus;
pub use self::read::Read;
