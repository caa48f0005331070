//! Splitting a grid into prefix and transposable region

use crate::types::{Cell, Grid};

/// Borrowed view of the transposable region
///
/// Row `r` of the region is the part of source row `start_row + r` from
/// column `start_col` onward. Rows shorter than `start_col` give an empty
/// region row.
#[derive(Debug, Clone)]
pub struct Region<'g> {
    start_row: usize,
    start_col: usize,
    rows: Vec<&'g [Cell]>,
}

impl<'g> Region<'g> {
    pub fn start_row(&self) -> usize {
        self.start_row
    }

    pub fn start_col(&self) -> usize {
        self.start_col
    }

    /// Number of region rows (source rows at or below `start_row`)
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Length of the widest region row
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    /// Number of cells inside the region
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(|r| r.len()).sum()
    }

    /// Region cell at region-relative (row, col)
    pub fn get(&self, row: usize, col: usize) -> Option<&'g Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn rows(&self) -> &[&'g [Cell]] {
        &self.rows
    }

    /// True when nothing would be transposed
    pub fn is_empty(&self) -> bool {
        self.cell_count() == 0
    }
}

/// A grid split at `(start_row, start_col)` into three disjoint parts
#[derive(Debug, Clone)]
pub struct Partition<'g> {
    /// Rows above `start_row`, full width
    pub prefix_rows: &'g [Vec<Cell>],
    /// For each row from `start_row` on, its cells left of `start_col`
    pub prefix_cols: Vec<&'g [Cell]>,
    /// Everything at or right of `start_col` and at or below `start_row`
    pub region: Region<'g>,
}

impl<'g> Partition<'g> {
    /// Split `grid`
    ///
    /// Indices past the grid extent select empty parts; bounds are
    /// checked by [`crate::validate::validate_coordinates`] beforehand.
    pub fn split(grid: &'g Grid, start_row: usize, start_col: usize) -> Self {
        let rows = grid.rows();
        let split_at = start_row.min(rows.len());
        let (prefix_rows, lower) = rows.split_at(split_at);

        let mut prefix_cols = Vec::with_capacity(lower.len());
        let mut region_rows = Vec::with_capacity(lower.len());
        for row in lower {
            let (left, right) = row.split_at(start_col.min(row.len()));
            prefix_cols.push(left);
            region_rows.push(right);
        }

        Partition {
            prefix_rows,
            prefix_cols,
            region: Region {
                start_row,
                start_col,
                rows: region_rows,
            },
        }
    }

    /// Cells across all three parts
    pub fn cell_count(&self) -> usize {
        self.prefix_rows.iter().map(Vec::len).sum::<usize>()
            + self.prefix_cols.iter().map(|r| r.len()).sum::<usize>()
            + self.region.cell_count()
    }
}
