use super::*;
use crate::*;

/// Row-major dense kernel.
#[derive(Debug, Clone)]
pub struct Dense {
    rows: usize,
    cols: usize,
    cells: Vec<Probability>,
}

impl Dense {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![0.; rows * cols],
        }
    }

    fn offset(&self, row: usize, col: usize) -> usize {
        assert!(row < self.rows, "row {} out of range {}", row, self.rows);
        assert!(col < self.cols, "col {} out of range {}", col, self.cols);
        row * self.cols + col
    }
}

impl Kernel for Dense {
    fn rows(&self) -> usize {
        self.rows
    }
    fn cols(&self) -> usize {
        self.cols
    }
    fn get(&self, row: usize, col: usize) -> Probability {
        self.cells[self.offset(row, col)]
    }
    fn set(&mut self, row: usize, col: usize, p: Probability) {
        let i = self.offset(row, col);
        self.cells[i] = p;
    }
    fn row(&self, row: usize) -> Box<dyn Iterator<Item = (usize, Probability)> + '_> {
        let start = self.offset(row, 0);
        Box::new(
            self.cells[start..start + self.cols]
                .iter()
                .copied()
                .enumerate()
                .filter(|(_, p)| *p != 0.),
        )
    }
}
