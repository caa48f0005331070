//! Start-index validation

use crate::error::{Axis, Result, TransposeError};

/// Convert a caller-supplied index into a grid index, rejecting negatives
pub fn check_index(field: &'static str, value: i64) -> Result<usize> {
    if value < 0 {
        return Err(TransposeError::invalid_config(
            field,
            format!("must be non-negative, got {}", value),
        ));
    }
    usize::try_from(value)
        .map_err(|_| TransposeError::invalid_config(field, format!("{} is too large", value)))
}

/// Check start indices against the sheet extent
///
/// An index equal to the extent is accepted: it selects an empty region and
/// the transpose becomes a no-op. Anything larger is a hard failure, never
/// clamped.
pub fn validate_coordinates(
    start_row: usize,
    start_col: usize,
    total_rows: usize,
    total_cols: usize,
) -> Result<()> {
    if start_row > total_rows {
        return Err(TransposeError::OutOfBounds {
            axis: Axis::Row,
            index: start_row,
            extent: total_rows,
        });
    }
    if start_col > total_cols {
        return Err(TransposeError::OutOfBounds {
            axis: Axis::Column,
            index: start_col,
            extent: total_cols,
        });
    }
    Ok(())
}
