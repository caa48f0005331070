//! Stitching prefix and transposed region back into one grid

use crate::config::PrefixPolicy;
use crate::partition::Partition;
use crate::transpose::Transposed;
use crate::types::{Cell, Grid};

/// Build the output grid
///
/// Rows above `start_row` are copied verbatim. Output row `start_row + c`
/// is the prefix of source row `start_row + c` followed by transposed row
/// `c`; when the transposed region has more rows than the source region,
/// the extra rows get an empty prefix. When it has fewer, the remaining
/// source rows are kept with their prefix columns only, so a region that
/// is empty leaves the grid unchanged.
pub fn reassemble(partition: &Partition<'_>, transposed: Transposed, policy: PrefixPolicy) -> Grid {
    let start_row = partition.region.start_row();
    let start_col = partition.region.start_col();
    let lower_rows = partition.prefix_cols.len().max(transposed.row_count());

    let mut grid = Grid::new();
    for row in partition.prefix_rows {
        grid.push_row(row.clone());
    }

    let mut body = transposed.rows.into_iter();
    for i in 0..lower_rows {
        let prefix = partition.prefix_cols.get(i).copied().unwrap_or(&[]);
        let tail = body.next().unwrap_or_default();

        let mut row = Vec::with_capacity(prefix.len().max(start_col) + tail.len());
        row.extend_from_slice(prefix);
        if policy == PrefixPolicy::OriginalRowPadded && !tail.is_empty() {
            // Prefix columns stay in place: the filler stands in for this
            // position of source row `start_row + i`
            let source_row = (start_row + i) as u32;
            for col in prefix.len()..start_col {
                row.push(Cell::empty(source_row, col as u32));
            }
        }
        row.extend(tail);
        grid.push_row(row);
    }

    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MissingCellPolicy;
    use crate::transpose::transpose_region;
    use crate::types::CellValue;

    fn numbers(rows: &[&[i64]]) -> Grid {
        Grid::from_values(
            rows.iter()
                .map(|r| r.iter().map(|&v| CellValue::from(v)).collect::<Vec<_>>()),
        )
    }

    fn run(grid: &Grid, start_row: usize, start_col: usize, policy: PrefixPolicy) -> Grid {
        let part = Partition::split(grid, start_row, start_col);
        let t = transpose_region(&part.region, MissingCellPolicy::Skip).unwrap();
        reassemble(&part, t, policy)
    }

    #[test]
    fn test_prefix_column_kept() {
        let grid = numbers(&[&[1, 2, 3], &[4, 5, 6]]);
        let out = run(&grid, 0, 1, PrefixPolicy::OriginalRow);
        assert_eq!(out.values(), numbers(&[&[1, 2, 5], &[4, 3, 6]]).values());
    }

    #[test]
    fn test_wide_region_grows_rows_with_empty_prefix() {
        let grid = numbers(&[&[0, 0, 0, 0], &[9, 1, 2, 3]]);
        let out = run(&grid, 1, 1, PrefixPolicy::OriginalRow);
        assert_eq!(
            out.values(),
            numbers(&[&[0, 0, 0, 0], &[9, 1], &[2], &[3]]).values()
        );
    }

    #[test]
    fn test_padded_policy_aligns_region() {
        let grid = numbers(&[&[0, 0, 0, 0], &[9, 1, 2, 3]]);
        let out = run(&grid, 1, 1, PrefixPolicy::OriginalRowPadded);
        let empty = CellValue::Empty;
        assert_eq!(
            out.values(),
            vec![
                numbers(&[&[0, 0, 0, 0]]).values()[0].clone(),
                vec![CellValue::from(9i64), CellValue::from(1i64)],
                vec![empty.clone(), CellValue::from(2i64)],
                vec![empty, CellValue::from(3i64)],
            ]
        );
        assert_eq!(out.get(2, 0).map(|c| (c.row, c.col)), Some((2, 0)));
    }

    #[test]
    fn test_padding_uses_source_prefix_positions() {
        // Row 2 has a one-cell prefix; its second prefix column is missing
        let grid = Grid::from_values(vec![
            vec![CellValue::from("h"), CellValue::from("h"), CellValue::from("h")],
            vec![
                CellValue::from("a"),
                CellValue::from("b"),
                CellValue::from(1i64),
                CellValue::from(2i64),
            ],
            vec![CellValue::from("c")],
        ]);
        let out = run(&grid, 1, 2, PrefixPolicy::OriginalRowPadded);

        assert_eq!(out.get(2, 2).map(|c| c.value.clone()), Some(CellValue::from(2i64)));
        let filler = out.get(2, 1).unwrap();
        assert!(filler.value.is_empty());
        let kept = out.get(2, 0).unwrap();
        assert_eq!((kept.row, kept.col), (2, 0));
        assert_eq!((filler.row, filler.col), (2, 1));
    }

    #[test]
    fn test_tall_region_keeps_leftover_prefixes() {
        let grid = numbers(&[&[1, 2], &[3, 4], &[5, 6]]);
        let out = run(&grid, 0, 1, PrefixPolicy::OriginalRow);
        assert_eq!(out.values(), numbers(&[&[1, 2, 4, 6], &[3], &[5]]).values());
        assert_eq!(out.cell_count(), grid.cell_count());
    }

    #[test]
    fn test_empty_region_is_noop() {
        let grid = numbers(&[&[1, 2, 3], &[4, 5]]);
        assert_eq!(run(&grid, 0, 3, PrefixPolicy::OriginalRow), grid);
        assert_eq!(run(&grid, 2, 0, PrefixPolicy::OriginalRowPadded), grid);
    }
}
