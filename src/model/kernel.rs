use super::*;
use crate::*;

/// A discrete probability kernel: a table of `rows` conditional
/// distributions over `cols` outcomes.
///
/// The context of a row (e.g. `(s, ja)` for transitions) is flattened by the
/// owner of the kernel. Implementations differ only in storage; all of them
/// must agree on `get` for every cell.
pub trait Kernel: Send + Sync + std::fmt::Debug {
    /// number of conditioning contexts
    fn rows(&self) -> usize;
    /// number of outcomes per context
    fn cols(&self) -> usize;
    /// P(col | row)
    fn get(&self, row: usize, col: usize) -> Probability;
    /// overwrite P(col | row)
    fn set(&mut self, row: usize, col: usize, p: Probability);
    /// the non-zero outcomes of a row, in ascending column order
    fn row(&self, row: usize) -> Box<dyn Iterator<Item = (usize, Probability)> + '_>;

    /// total probability mass of a row
    fn mass(&self, row: usize) -> Probability {
        self.row(row).map(|(_, p)| p).sum()
    }
}

/// Storage layout chosen when a model is constructed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Storage {
    /// flat row-major table, best for small or dense models
    #[default]
    Dense,
    /// per-row ordered maps, best when most entries are zero
    Sparse,
}

impl Storage {
    /// allocate an all-zero kernel of the requested shape
    pub fn kernel(&self, rows: usize, cols: usize) -> Box<dyn Kernel> {
        match self {
            Self::Dense => Box::new(Dense::new(rows, cols)),
            Self::Sparse => Box::new(Sparse::new(rows, cols)),
        }
    }
}
