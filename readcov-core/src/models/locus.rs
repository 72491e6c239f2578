use num_traits::{PrimInt, Unsigned};
use std::fmt::{self, Display};

///
/// A query position, optionally annotated with the number of reads covering it.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy)]
pub struct Locus<I>
where
    I: PrimInt + Unsigned + Send + Sync,
{
    pub position: I,
    pub coverage: Option<u32>,
}

impl<I> Locus<I>
where
    I: PrimInt + Unsigned + Send + Sync,
{
    pub fn new(position: I) -> Self {
        Locus {
            position,
            coverage: None,
        }
    }

    ///
    /// Get the csv row for this locus. Unannotated loci get an empty coverage field.
    ///
    pub fn as_string(&self) -> String
    where
        I: Display,
    {
        format!(
            "{},{}",
            self.position,
            self.coverage.map_or(String::new(), |c| c.to_string())
        )
    }
}

impl<I> From<I> for Locus<I>
where
    I: PrimInt + Unsigned + Send + Sync,
{
    fn from(position: I) -> Self {
        Locus::new(position)
    }
}

impl<I> Display for Locus<I>
where
    I: PrimInt + Unsigned + Send + Sync + Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}
