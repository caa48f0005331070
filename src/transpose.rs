//! Row/column swap over a region

use crate::config::MissingCellPolicy;
use crate::error::{Result, TransposeError};
use crate::partition::Region;
use crate::types::Cell;

/// Transposed region rows, owning deep copies of the source cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transposed {
    /// `rows[c]` holds what was region column `c`
    pub rows: Vec<Vec<Cell>>,
    /// Source cells carried over (padding excluded)
    pub source_cells: usize,
    /// Empty cells inserted by [`MissingCellPolicy::PadEmpty`]
    pub padded_cells: usize,
}

impl Transposed {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Transpose a region: `out[c][r] = region[r][c]` wherever the source cell exists
///
/// For jagged regions, `policy` decides what happens to positions a short
/// row does not reach. With [`MissingCellPolicy::Skip`] output row `c` simply
/// holds the cells of every region row longer than `c`, in row order. With
/// [`MissingCellPolicy::PadEmpty`] gaps before the last present cell become
/// explicit empty cells tagged with the source coordinate they stand in for.
///
/// # Examples
///
/// ```
/// use xltranspose::config::MissingCellPolicy;
/// use xltranspose::partition::Partition;
/// use xltranspose::transpose::transpose_region;
/// use xltranspose::types::{CellValue, Grid};
///
/// let grid = Grid::from_values(vec![
///     vec![CellValue::from(1i64), CellValue::from(2i64), CellValue::from(3i64)],
///     vec![CellValue::from(4i64), CellValue::from(5i64)],
/// ]);
/// let part = Partition::split(&grid, 0, 0);
/// let out = transpose_region(&part.region, MissingCellPolicy::Skip).unwrap();
/// assert_eq!(out.rows.iter().map(Vec::len).collect::<Vec<_>>(), vec![2, 2, 1]);
/// ```
pub fn transpose_region(region: &Region<'_>, policy: MissingCellPolicy) -> Result<Transposed> {
    let width = region.width();
    let mut out = Transposed {
        rows: Vec::with_capacity(width),
        ..Transposed::default()
    };

    let mut slots: Vec<Option<&Cell>> = Vec::with_capacity(region.row_count());
    for c in 0..width {
        slots.clear();
        slots.extend(region.rows().iter().map(|row| row.get(c)));

        let row = match policy {
            MissingCellPolicy::Skip => slots.iter().flatten().map(|&cell| cell.clone()).collect(),
            MissingCellPolicy::PadEmpty => {
                let filled = slots.iter().rposition(Option::is_some).map_or(0, |i| i + 1);
                let mut row = Vec::with_capacity(filled);
                for (r, slot) in slots[..filled].iter().enumerate() {
                    match slot {
                        Some(cell) => row.push((*cell).clone()),
                        None => {
                            out.padded_cells += 1;
                            row.push(Cell::empty(
                                (region.start_row() + r) as u32,
                                (region.start_col() + c) as u32,
                            ));
                        }
                    }
                }
                row
            }
        };
        out.rows.push(row);
    }

    out.source_cells = out.rows.iter().map(Vec::len).sum::<usize>() - out.padded_cells;
    if out.source_cells != region.cell_count() {
        return Err(TransposeError::Internal(format!(
            "transposed {} cells but region holds {}",
            out.source_cells,
            region.cell_count()
        )));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::Partition;
    use crate::types::{CellValue, Grid};

    fn numbers(rows: &[&[i64]]) -> Grid {
        Grid::from_values(
            rows.iter()
                .map(|r| r.iter().map(|&v| CellValue::from(v)).collect::<Vec<_>>()),
        )
    }

    fn values(t: &Transposed) -> Vec<Vec<CellValue>> {
        t.rows
            .iter()
            .map(|r| r.iter().map(|c| c.value.clone()).collect())
            .collect()
    }

    fn expect(rows: &[&[i64]]) -> Vec<Vec<CellValue>> {
        numbers(rows).values()
    }

    #[test]
    fn test_rectangular() {
        let grid = numbers(&[&[1, 2, 3], &[4, 5, 6]]);
        let part = Partition::split(&grid, 0, 1);
        let t = transpose_region(&part.region, MissingCellPolicy::Skip).unwrap();

        assert_eq!(values(&t), expect(&[&[2, 5], &[3, 6]]));
        // Cells keep the coordinate they were read from
        assert_eq!((t.rows[1][0].row, t.rows[1][0].col), (0, 2));
    }

    #[test]
    fn test_jagged_skip() {
        let grid = numbers(&[&[1, 2, 3], &[4, 5]]);
        let part = Partition::split(&grid, 0, 0);
        let t = transpose_region(&part.region, MissingCellPolicy::Skip).unwrap();

        assert_eq!(values(&t), expect(&[&[1, 4], &[2, 5], &[3]]));
        assert_eq!(t.padded_cells, 0);
    }

    #[test]
    fn test_jagged_skip_moves_later_cells_up() {
        let grid = numbers(&[&[1], &[2, 3]]);
        let part = Partition::split(&grid, 0, 0);
        let t = transpose_region(&part.region, MissingCellPolicy::Skip).unwrap();

        assert_eq!(values(&t), expect(&[&[1, 2], &[3]]));
    }

    #[test]
    fn test_jagged_pad_empty() {
        let grid = numbers(&[&[1], &[2, 3], &[4]]);
        let part = Partition::split(&grid, 0, 0);
        let t = transpose_region(&part.region, MissingCellPolicy::PadEmpty).unwrap();

        assert_eq!(
            values(&t),
            vec![
                expect(&[&[1, 2, 4]])[0].clone(),
                vec![CellValue::Empty, CellValue::from(3i64)],
            ]
        );
        assert_eq!(t.padded_cells, 1);
        assert_eq!(t.source_cells, 4);
        assert_eq!((t.rows[1][0].row, t.rows[1][0].col), (0, 1));
    }

    #[test]
    fn test_involution_on_region() {
        let grid = numbers(&[&[1, 2, 3, 4], &[5, 6, 7, 8], &[9, 10, 11, 12]]);
        let part = Partition::split(&grid, 1, 1);
        let once = transpose_region(&part.region, MissingCellPolicy::Skip).unwrap();

        let once_grid = Grid::from_rows(once.rows.clone());
        let back = Partition::split(&once_grid, 0, 0);
        let twice = transpose_region(&back.region, MissingCellPolicy::Skip).unwrap();

        assert_eq!(values(&twice), expect(&[&[6, 7, 8], &[10, 11, 12]]));
    }

    #[test]
    fn test_empty_region() {
        let grid = numbers(&[&[1, 2]]);
        let part = Partition::split(&grid, 1, 0);
        let t = transpose_region(&part.region, MissingCellPolicy::Skip).unwrap();
        assert_eq!(t.row_count(), 0);
        assert_eq!(t.source_cells, 0);
    }
}
