//! Writing grids to xlsx files
//!
//! [`ExcelWriter`] streams rows into a temporary file next to the target and
//! only moves it into place in [`ExcelWriter::save`]. A writer dropped before
//! `save`, or a failed save, leaves nothing at the target path.

use crate::error::{Result, TransposeError};
use crate::fast_writer::FastWorkbook;
use crate::types::{CellValue, Grid};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Capability that persists a grid as a sheet
pub trait SheetWriter {
    /// Write `grid` as sheet `sheet_name` of a new file at `path`
    ///
    /// Fails with `WriteError` on I/O failure.
    fn write_grid(&self, path: &Path, grid: &Grid, sheet_name: &str) -> Result<()>;

    /// Whether the writer can replace the file it would be reading from
    fn supports_in_place(&self) -> bool {
        false
    }
}

/// [`SheetWriter`] producing xlsx files through [`ExcelWriter`]
#[derive(Debug, Clone, Copy)]
pub struct WorkbookSheetWriter {
    flush_interval: u32,
}

impl Default for WorkbookSheetWriter {
    fn default() -> Self {
        WorkbookSheetWriter {
            flush_interval: 1000,
        }
    }
}

impl WorkbookSheetWriter {
    /// Set rows between flushes of the underlying zip stream
    pub fn with_flush_interval(mut self, interval: u32) -> Self {
        self.flush_interval = interval;
        self
    }
}

impl SheetWriter for WorkbookSheetWriter {
    fn write_grid(&self, path: &Path, grid: &Grid, sheet_name: &str) -> Result<()> {
        let mut writer = ExcelWriterBuilder::new(path)
            .with_sheet_name(sheet_name)
            .with_flush_interval(self.flush_interval)
            .build()?;
        writer.write_grid(grid)?;
        writer.save()
    }
}

/// xlsx writer with atomic save
///
/// # Examples
///
/// ```no_run
/// use xltranspose::types::CellValue;
/// use xltranspose::writer::ExcelWriter;
///
/// let mut writer = ExcelWriter::new("output.xlsx").unwrap();
/// writer.write_row(&[CellValue::from("Name"), CellValue::from(30i64)]).unwrap();
/// writer.save().unwrap();
/// ```
pub struct ExcelWriter {
    inner: FastWorkbook<BufWriter<File>>,
    temp: NamedTempFile,
    target: PathBuf,
    current_sheet_name: String,
}

impl ExcelWriter {
    /// Create a writer targeting `path` with a single sheet named "Sheet1"
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        ExcelWriterBuilder::new(path).build()
    }

    fn create(target: &Path, sheet_name: &str) -> Result<Self> {
        let dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let temp = temp_file_in(dir).map_err(|e| TransposeError::write_error(target, e))?;
        let file = temp
            .as_file()
            .try_clone()
            .map_err(|e| TransposeError::write_error(target, e))?;

        let mut inner = FastWorkbook::new(BufWriter::with_capacity(64 * 1024, file));
        inner.add_worksheet(sheet_name)?;

        Ok(ExcelWriter {
            inner,
            temp,
            target: target.to_path_buf(),
            current_sheet_name: sheet_name.to_string(),
        })
    }

    /// Write a row with typed cell values
    pub fn write_row<'a, I>(&mut self, cells: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a CellValue>,
    {
        let target = &self.target;
        self.inner
            .write_row(cells)
            .map_err(|e| into_write_error(target, e))
    }

    /// Write every row of a grid, in order
    pub fn write_grid(&mut self, grid: &Grid) -> Result<()> {
        for row in grid.rows() {
            self.write_row(row.iter().map(|cell| &cell.value))?;
        }
        Ok(())
    }

    /// Add a new sheet and switch to it
    pub fn add_sheet(&mut self, name: &str) -> Result<()> {
        self.inner.add_worksheet(name)?;
        self.current_sheet_name = name.to_string();
        Ok(())
    }

    /// Set flush interval (rows between flushes of the zip stream)
    pub fn set_flush_interval(&mut self, interval: u32) {
        self.inner.set_flush_interval(interval);
    }

    /// Finish the workbook and move it to the target path
    pub fn save(self) -> Result<()> {
        let ExcelWriter {
            inner,
            temp,
            target,
            ..
        } = self;

        let mut out = inner.close().map_err(|e| into_write_error(&target, e))?;
        out.flush()
            .map_err(|e| TransposeError::write_error(&target, e))?;
        drop(out);

        temp.persist(&target)
            .map_err(|e| TransposeError::write_error(&target, e.error))?;
        Ok(())
    }

    /// Get current row number (0-based count of rows written to the sheet)
    pub fn current_row(&self) -> u32 {
        self.inner.current_row()
    }

    pub fn current_sheet_name(&self) -> &str {
        &self.current_sheet_name
    }

    /// Non-empty cells written so far
    pub fn cells_written(&self) -> u64 {
        self.inner.cells_written()
    }
}

// Temp file in the destination directory, created with the mode a plain
// `File::create` would give (0o666 less the umask) since `persist` keeps it.
fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".xltranspose-").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

fn into_write_error(path: &Path, err: TransposeError) -> TransposeError {
    match err {
        TransposeError::Io(e) => TransposeError::write_error(path, e),
        other => other,
    }
}

/// Builder for creating configured Excel writers
pub struct ExcelWriterBuilder {
    path: PathBuf,
    sheet_name: Option<String>,
    flush_interval: Option<u32>,
}

impl ExcelWriterBuilder {
    /// Create a new builder
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ExcelWriterBuilder {
            path: path.as_ref().to_path_buf(),
            sheet_name: None,
            flush_interval: None,
        }
    }

    /// Set the sheet name
    pub fn with_sheet_name(mut self, name: &str) -> Self {
        self.sheet_name = Some(name.to_string());
        self
    }

    /// Set flush interval (rows between flushes)
    pub fn with_flush_interval(mut self, interval: u32) -> Self {
        self.flush_interval = Some(interval);
        self
    }

    /// Build the writer
    pub fn build(self) -> Result<ExcelWriter> {
        let sheet_name = self.sheet_name.unwrap_or_else(|| "Sheet1".to_string());
        let mut writer = ExcelWriter::create(&self.path, &sheet_name)?;

        if let Some(interval) = self.flush_interval {
            writer.set_flush_interval(interval);
        }

        Ok(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_writer_creation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let writer = ExcelWriter::new(&path).unwrap();

        assert!(!path.exists());
        writer.save().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_dropped_writer_leaves_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        {
            let mut writer = ExcelWriter::new(&path).unwrap();
            writer.write_row(&[CellValue::from("partial")]).unwrap();
        }

        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_write_grid_counts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let grid = Grid::from_values(vec![
            vec![CellValue::from("A"), CellValue::Empty, CellValue::from(3.5)],
            vec![],
            vec![CellValue::Bool(true)],
        ]);

        let mut writer = ExcelWriter::new(&path).unwrap();
        writer.write_grid(&grid).unwrap();
        assert_eq!(writer.current_row(), 3);
        assert_eq!(writer.cells_written(), 3);
        writer.save().unwrap();
    }

    #[test]
    fn test_builder() {
        let dir = tempdir().unwrap();
        let writer = ExcelWriterBuilder::new(dir.path().join("b.xlsx"))
            .with_sheet_name("CustomSheet")
            .with_flush_interval(500)
            .build()
            .unwrap();

        assert_eq!(writer.current_sheet_name(), "CustomSheet");
        assert!(writer.save().is_ok());
    }

    #[test]
    fn test_invalid_sheet_name() {
        let dir = tempdir().unwrap();
        let result = ExcelWriterBuilder::new(dir.path().join("c.xlsx"))
            .with_sheet_name("bad:name")
            .build();
        assert!(matches!(result, Err(TransposeError::InvalidConfig { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_mode_matches_plain_create() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let plain = dir.path().join("plain.bin");
        File::create(&plain).unwrap();
        let path = dir.path().join("out.xlsx");
        ExcelWriter::new(&path).unwrap().save().unwrap();

        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&path), mode(&plain));
    }

    #[test]
    fn test_missing_directory_is_write_error() {
        let dir = tempdir().unwrap();
        let result = ExcelWriter::new(dir.path().join("nope").join("out.xlsx"));
        assert!(matches!(result, Err(TransposeError::WriteError { .. })));
    }
}
