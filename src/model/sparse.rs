use super::*;
use crate::*;
use std::collections::BTreeMap;

/// Sparse kernel storing only the non-zero cells of each row.
///
/// Setting a cell to zero removes it, so `row` never yields zeros.
#[derive(Debug, Clone)]
pub struct Sparse {
    cols: usize,
    cells: Vec<BTreeMap<usize, Probability>>,
}

impl Sparse {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            cells: vec![BTreeMap::new(); rows],
        }
    }

    fn check(&self, row: usize, col: usize) {
        assert!(row < self.cells.len(), "row {} out of range {}", row, self.cells.len());
        assert!(col < self.cols, "col {} out of range {}", col, self.cols);
    }
}

impl Kernel for Sparse {
    fn rows(&self) -> usize {
        self.cells.len()
    }
    fn cols(&self) -> usize {
        self.cols
    }
    fn get(&self, row: usize, col: usize) -> Probability {
        self.check(row, col);
        self.cells[row].get(&col).copied().unwrap_or_default()
    }
    fn set(&mut self, row: usize, col: usize, p: Probability) {
        self.check(row, col);
        if p == 0. {
            self.cells[row].remove(&col);
        } else {
            self.cells[row].insert(col, p);
        }
    }
    fn row(&self, row: usize) -> Box<dyn Iterator<Item = (usize, Probability)> + '_> {
        self.check(row, 0);
        Box::new(self.cells[row].iter().map(|(col, p)| (*col, *p)))
    }
}
