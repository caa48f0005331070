//! One transposition job, start to finish
//!
//! Validation, loading, partitioning, transposition, reassembly, and
//! emission run in that order on the calling thread. Nothing is written
//! unless every earlier stage succeeded.

use crate::config::TransposeConfig;
use crate::emit::{check_path_conflict, emit};
use crate::error::Result;
use crate::partition::Partition;
use crate::reader::{SheetReader, WorkbookSheetReader};
use crate::reassemble::reassemble;
use crate::transpose::transpose_region;
use crate::types::Grid;
use crate::validate::validate_coordinates;
use crate::writer::{SheetWriter, WorkbookSheetWriter};
use std::path::PathBuf;

#[cfg(feature = "tracing")]
use tracing::{debug, info, info_span};

/// Outcome of a successful job
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransposeReport {
    pub output_path: PathBuf,
    pub sheet_name: String,
    /// Rows and longest row of the source sheet
    pub source_dimensions: (usize, usize),
    /// Rows and longest row of the written sheet
    pub output_dimensions: (usize, usize),
    /// Source cells that moved through the transposer
    pub cells_transposed: usize,
    /// Empty cells inserted to fill jagged gaps
    pub cells_padded: usize,
    pub rows_written: usize,
    /// Non-empty cells written
    pub cells_written: usize,
}

/// Transposition pipeline over pluggable reader and writer capabilities
#[derive(Debug, Clone, Default)]
pub struct Pipeline<R, W> {
    reader: R,
    writer: W,
}

impl Pipeline<WorkbookSheetReader, WorkbookSheetWriter> {
    /// Pipeline reading workbooks with calamine and writing xlsx
    pub fn workbook() -> Self {
        Pipeline::new(WorkbookSheetReader, WorkbookSheetWriter::default())
    }
}

impl<R: SheetReader, W: SheetWriter> Pipeline<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Pipeline { reader, writer }
    }

    /// Run one job
    pub fn run(&self, config: &TransposeConfig) -> Result<TransposeReport> {
        #[cfg(feature = "tracing")]
        let _span = info_span!(
            "transpose",
            input = %config.input_path().display(),
            output = %config.output_path().display(),
            start_row = config.start_row(),
            start_col = config.start_col()
        )
        .entered();

        // Refuse before reading anything when the writer would clobber the input
        if !self.writer.supports_in_place() {
            check_path_conflict(config.input_path(), config.output_path())?;
        }

        let sheet = self.reader.read_sheet(config.input_path(), config.sheet())?;
        let source_dimensions = (sheet.grid.total_rows(), sheet.grid.total_cols());
        #[cfg(feature = "tracing")]
        debug!(
            sheet = %sheet.name,
            rows = source_dimensions.0,
            cols = source_dimensions.1,
            "sheet loaded"
        );

        let grid = transpose_grid(&sheet.grid, config)?;
        let output_dimensions = (grid.total_rows(), grid.total_cols());

        let sheet_name = config.output_sheet_name().unwrap_or(&sheet.name);
        let summary = emit(
            &self.writer,
            &grid.grid,
            config.input_path(),
            config.output_path(),
            sheet_name,
        )?;
        #[cfg(feature = "tracing")]
        info!(
            rows = summary.rows_written,
            cells = summary.cells_written,
            "wrote {}",
            summary.output_path.display()
        );

        Ok(TransposeReport {
            output_path: summary.output_path,
            sheet_name: sheet_name.to_string(),
            source_dimensions,
            output_dimensions,
            cells_transposed: grid.cells_transposed,
            cells_padded: grid.cells_padded,
            rows_written: summary.rows_written,
            cells_written: summary.cells_written,
        })
    }
}

/// In-memory result of [`transpose_grid`]
#[derive(Debug, Clone, PartialEq)]
pub struct TransposedGrid {
    pub grid: Grid,
    pub cells_transposed: usize,
    pub cells_padded: usize,
}

impl TransposedGrid {
    pub fn total_rows(&self) -> usize {
        self.grid.total_rows()
    }

    pub fn total_cols(&self) -> usize {
        self.grid.total_cols()
    }
}

/// Validate, partition, transpose, and reassemble an in-memory grid
pub fn transpose_grid(grid: &Grid, config: &TransposeConfig) -> Result<TransposedGrid> {
    validate_coordinates(
        config.start_row(),
        config.start_col(),
        grid.total_rows(),
        grid.total_cols(),
    )?;

    let partition = Partition::split(grid, config.start_row(), config.start_col());
    #[cfg(feature = "tracing")]
    debug!(
        prefix_rows = partition.prefix_rows.len(),
        region_rows = partition.region.row_count(),
        region_cols = partition.region.width(),
        region_cells = partition.region.cell_count(),
        "grid partitioned"
    );

    let transposed = transpose_region(&partition.region, config.missing_cells())?;
    let cells_transposed = transposed.source_cells;
    let cells_padded = transposed.padded_cells;
    #[cfg(feature = "tracing")]
    debug!(
        rows = transposed.row_count(),
        padded = cells_padded,
        "region transposed"
    );

    Ok(TransposedGrid {
        grid: reassemble(&partition, transposed, config.prefix_policy()),
        cells_transposed,
        cells_padded,
    })
}

/// Transpose a workbook file as described by `config`
///
/// # Examples
///
/// ```no_run
/// use xltranspose::{transpose_file, TransposeConfig};
///
/// let config = TransposeConfig::builder("report.xlsx", "report_t.xlsx")
///     .start_row(1)
///     .start_col(1)
///     .build()?;
/// let report = transpose_file(&config)?;
/// println!("{} rows written", report.rows_written);
/// # Ok::<(), xltranspose::TransposeError>(())
/// ```
pub fn transpose_file(config: &TransposeConfig) -> Result<TransposeReport> {
    Pipeline::workbook().run(config)
}
