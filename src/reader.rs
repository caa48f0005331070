//! Sheet loading
//!
//! [`ExcelReader`] opens xlsx, xls, and ods workbooks through calamine and
//! materializes one sheet into a [`Grid`]. The pipeline reaches it through the
//! [`SheetReader`] trait so other sources can be plugged in.

use crate::config::SheetSelector;
use crate::error::{Result, TransposeError};
use crate::fast_writer::xml_writer::decode_escapes;
use crate::types::{Cell, CellValue, Grid};
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// One sheet loaded from a workbook
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSheet {
    /// Name of the sheet in its workbook
    pub name: String,
    /// Sheet content
    pub grid: Grid,
}

/// Capability that turns a file into a grid of typed cells
pub trait SheetReader {
    /// Load the selected sheet of the file at `path`
    ///
    /// Fails with `FileNotFound` when nothing exists at `path` and with
    /// `UnreadableFormat` when the file or sheet cannot be parsed.
    fn read_sheet(&self, path: &Path, sheet: &SheetSelector) -> Result<LoadedSheet>;
}

/// [`SheetReader`] backed by [`ExcelReader`]
///
/// Every call opens the workbook, loads the sheet, and drops the file handle
/// before returning.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkbookSheetReader;

impl SheetReader for WorkbookSheetReader {
    fn read_sheet(&self, path: &Path, sheet: &SheetSelector) -> Result<LoadedSheet> {
        let mut reader = ExcelReader::open(path)?;
        reader.load(sheet)
    }
}

/// Excel workbook reader
pub struct ExcelReader {
    path: PathBuf,
    workbook: Sheets<std::io::BufReader<std::fs::File>>,
    // xlsx text carries `_xHHHH_` escapes that calamine hands back verbatim
    decode_text: bool,
}

impl ExcelReader {
    /// Open a workbook for reading
    ///
    /// Supports XLSX, XLS, and ODS formats. Format is auto-detected from file extension.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use xltranspose::reader::ExcelReader;
    ///
    /// let reader = ExcelReader::open("data.xlsx").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TransposeError::FileNotFound(path.to_path_buf()));
        }

        let workbook = open_workbook_auto(path).map_err(|e| match e {
            calamine::Error::Io(io) if io.kind() == ErrorKind::NotFound => {
                TransposeError::FileNotFound(path.to_path_buf())
            }
            other => unreadable(path, other),
        })?;

        Ok(ExcelReader {
            path: path.to_path_buf(),
            decode_text: matches!(workbook, Sheets::Xlsx(_)),
            workbook,
        })
    }

    /// Get list of sheet names in the workbook
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// Get the number of sheets in the workbook
    pub fn sheet_count(&self) -> usize {
        self.workbook.sheet_names().len()
    }

    /// Resolve a selector to a sheet name
    pub fn resolve(&self, sheet: &SheetSelector) -> Result<String> {
        let names = self.sheet_names();
        let found = match sheet {
            SheetSelector::Index(i) => names.get(*i).cloned(),
            SheetSelector::Name(n) => names.iter().find(|s| *s == n).cloned(),
        };
        found.ok_or_else(|| TransposeError::UnreadableFormat {
            path: self.path.clone(),
            reason: format!(
                "sheet {} not found. Available sheets: {}",
                sheet,
                names.join(", ")
            ),
        })
    }

    /// Load a sheet into a grid
    ///
    /// Positions are kept absolute: leading empty rows and columns, and gaps
    /// between cells, become explicit `Empty` cells. Each row ends at its
    /// last non-empty cell. Formula cells yield their formula text, never
    /// the cached result.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use xltranspose::config::SheetSelector;
    /// use xltranspose::reader::ExcelReader;
    ///
    /// let mut reader = ExcelReader::open("data.xlsx").unwrap();
    /// let sheet = reader.load(&SheetSelector::Index(0)).unwrap();
    /// println!("{} rows", sheet.grid.total_rows());
    /// ```
    pub fn load(&mut self, sheet: &SheetSelector) -> Result<LoadedSheet> {
        let name = self.resolve(sheet)?;

        let values = self
            .workbook
            .worksheet_range(&name)
            .map_err(|e| unreadable(&self.path, e))?;
        let formulas = self
            .workbook
            .worksheet_formula(&name)
            .map_err(|e| unreadable(&self.path, e))?;

        Ok(LoadedSheet {
            name,
            grid: build_grid(&values, &formulas, self.decode_text),
        })
    }

    /// Get the dimensions of a sheet (rows, cols) counted from A1
    pub fn dimensions(&mut self, sheet: &SheetSelector) -> Result<(usize, usize)> {
        let name = self.resolve(sheet)?;
        let range = self
            .workbook
            .worksheet_range(&name)
            .map_err(|e| unreadable(&self.path, e))?;

        Ok(range
            .end()
            .map(|(r, c)| (r as usize + 1, c as usize + 1))
            .unwrap_or((0, 0)))
    }
}

fn unreadable(path: &Path, err: impl std::fmt::Display) -> TransposeError {
    TransposeError::UnreadableFormat {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

fn build_grid(values: &Range<Data>, formulas: &Range<String>, decode_text: bool) -> Grid {
    let end = match (values.end(), formulas.end()) {
        (Some(a), Some(b)) => Some((a.0.max(b.0), a.1.max(b.1))),
        (a, b) => a.or(b),
    };
    let Some((end_row, end_col)) = end else {
        return Grid::new();
    };

    let mut grid = Grid::new();
    for r in 0..=end_row {
        let mut row = Vec::new();
        for c in 0..=end_col {
            let value = match formulas.get_value((r, c)) {
                Some(f) if !f.is_empty() => formula_value(f),
                _ => values
                    .get_value((r, c))
                    .map(data_to_cellvalue)
                    .unwrap_or(CellValue::Empty),
            };
            let value = if decode_text {
                decode_cell_text(value)
            } else {
                value
            };
            row.push(Cell::new(r, c, value));
        }
        while row.last().is_some_and(|cell| cell.value.is_empty()) {
            row.pop();
        }
        grid.push_row(row);
    }
    grid
}

fn formula_value(text: &str) -> CellValue {
    if text.starts_with('=') {
        CellValue::Formula(text.to_string())
    } else {
        CellValue::Formula(format!("={}", text))
    }
}

fn decode_cell_text(value: CellValue) -> CellValue {
    match value {
        CellValue::String(s) => CellValue::String(decode_owned(s)),
        CellValue::Error(e) => CellValue::Error(decode_owned(e)),
        CellValue::Formula(f) => CellValue::Formula(decode_owned(f)),
        other => other,
    }
}

fn decode_owned(text: String) -> String {
    let decoded = match decode_escapes(&text) {
        Cow::Owned(d) => Some(d),
        Cow::Borrowed(_) => None,
    };
    decoded.unwrap_or(text)
}

/// Convert calamine Data to our CellValue
fn data_to_cellvalue(dt: &Data) -> CellValue {
    match dt {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(d) => CellValue::DateTime(d.as_f64()),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::DateTimeIso(s) => CellValue::String(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datatype_conversion() {
        let dt = Data::String("test".to_string());
        assert_eq!(data_to_cellvalue(&dt), CellValue::String("test".to_string()));

        let dt = Data::Int(42);
        assert_eq!(data_to_cellvalue(&dt), CellValue::Number(42.0));

        let dt = Data::Error(calamine::CellErrorType::Div0);
        assert_eq!(data_to_cellvalue(&dt), CellValue::Error("#DIV/0!".to_string()));
    }

    #[test]
    fn test_build_grid_keeps_positions() {
        // B2 = 1, D2 = "x", C3 = formula
        let mut values: Range<Data> = Range::new((1, 1), (2, 3));
        values.set_value((1, 1), Data::Float(1.0));
        values.set_value((1, 3), Data::String("x".to_string()));
        values.set_value((2, 2), Data::Float(3.0));
        let mut formulas: Range<String> = Range::new((2, 2), (2, 2));
        formulas.set_value((2, 2), "B2+2".to_string());

        let grid = build_grid(&values, &formulas, true);
        assert_eq!(grid.total_rows(), 3);
        assert_eq!(grid.row(0).map(<[Cell]>::len), Some(0));
        assert_eq!(
            grid.values()[1],
            vec![
                CellValue::Empty,
                CellValue::Number(1.0),
                CellValue::Empty,
                CellValue::String("x".to_string()),
            ]
        );
        assert_eq!(
            grid.values()[2],
            vec![
                CellValue::Empty,
                CellValue::Empty,
                CellValue::Formula("=B2+2".to_string()),
            ]
        );
    }

    #[test]
    fn test_build_grid_empty_ranges() {
        let values: Range<Data> = Range::empty();
        let formulas: Range<String> = Range::empty();
        assert!(build_grid(&values, &formulas, true).is_empty());
    }

    #[test]
    fn test_build_grid_decodes_xlsx_escapes() {
        let mut values: Range<Data> = Range::new((0, 0), (0, 1));
        values.set_value((0, 0), Data::String("a_x0009_b".to_string()));
        values.set_value((0, 1), Data::String("_x005F_x0041_".to_string()));
        let formulas: Range<String> = Range::empty();

        assert_eq!(
            build_grid(&values, &formulas, true).values()[0],
            vec![
                CellValue::String("a\tb".to_string()),
                CellValue::String("_x0041_".to_string()),
            ]
        );
        // Other formats have no such escaping
        assert_eq!(
            build_grid(&values, &formulas, false).values()[0][1],
            CellValue::String("_x005F_x0041_".to_string())
        );
    }

    #[test]
    fn test_missing_file() {
        let err = ExcelReader::open("definitely/not/here.xlsx").err().unwrap();
        assert!(matches!(err, TransposeError::FileNotFound(_)));
    }
}
