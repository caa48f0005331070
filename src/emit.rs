//! Handing the finished grid to a [`SheetWriter`]

use crate::error::{Result, TransposeError};
use crate::types::Grid;
use crate::writer::SheetWriter;
use std::path::{Path, PathBuf};

/// What was written by [`emit`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmitSummary {
    pub output_path: PathBuf,
    pub rows_written: usize,
    /// Non-empty cells in the written grid
    pub cells_written: usize,
}

/// Resolve `path` as far as the filesystem allows
///
/// The file itself may not exist yet (outputs usually don't), so the parent
/// directory is canonicalized and the file name re-attached.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(p) = path.canonicalize() {
        return p;
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (parent.canonicalize(), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

/// Fail with `PathConflict` when `input` and `output` name the same file
pub fn check_path_conflict(input: &Path, output: &Path) -> Result<()> {
    if resolve(input) == resolve(output) {
        return Err(TransposeError::PathConflict(output.to_path_buf()));
    }
    Ok(())
}

/// Write `grid` to `output` through `writer`
///
/// The grid is complete before this is called, so a failure here never
/// follows a partial write by the pipeline itself.
pub fn emit<W: SheetWriter + ?Sized>(
    writer: &W,
    grid: &Grid,
    input: &Path,
    output: &Path,
    sheet_name: &str,
) -> Result<EmitSummary> {
    if !writer.supports_in_place() {
        check_path_conflict(input, output)?;
    }

    writer.write_grid(output, grid, sheet_name)?;

    Ok(EmitSummary {
        output_path: output.to_path_buf(),
        rows_written: grid.total_rows(),
        cells_written: grid
            .rows()
            .iter()
            .flatten()
            .filter(|c| !c.value.is_empty())
            .count(),
    })
}
