use num_traits::{PrimInt, Unsigned};
use std::fmt::{self, Display};

/// A sequencing read, i.e. the half-open range `[start, start + length)`.
///
/// Reads are stored the way the sequencer reports them (start and length) rather
/// than as `[start, end)`, so a read can be malformed: a zero length, or a length
/// that pushes the end past the coordinate type. See [`Read::is_valid`].
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy)]
pub struct Read<I>
where
    I: PrimInt + Unsigned + Send + Sync,
{
    pub start: I,
    pub length: I,
}

impl<I> Read<I>
where
    I: PrimInt + Unsigned + Send + Sync,
{
    pub fn new(start: I, length: I) -> Self {
        Read { start, length }
    }

    /// Exclusive end of the read, or `None` if it does not fit in `I`.
    #[inline]
    pub fn end(&self) -> Option<I> {
        self.start.checked_add(&self.length)
    }

    /// A read is valid when it covers at least one position and its end is representable.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.length > I::zero() && self.end().is_some()
    }

    /// Whether `start <= position < start + length`.
    #[inline]
    pub fn covers(&self, position: I) -> bool {
        match self.end() {
            Some(end) => self.start <= position && position < end,
            None => false,
        }
    }
}

impl<I> Display for Read<I>
where
    I: PrimInt + Unsigned + Send + Sync + Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.start, self.length)
    }
}
