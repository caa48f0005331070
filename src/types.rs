//! Type definitions for sheet data

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::fmt;

/// Represents a single cell value in a worksheet
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellValue {
    /// Empty cell
    Empty,
    /// String value
    String(String),
    /// Numeric value
    Number(f64),
    /// Boolean value
    Bool(bool),
    /// DateTime value (Excel serial date number)
    DateTime(f64),
    /// Error literal such as `#DIV/0!`
    Error(String),
    /// Formula value (e.g., "=SUM(A1:A10)")
    ///
    /// Treated as opaque text: references are never rewritten when the
    /// cell moves.
    Formula(String),
}

impl CellValue {
    /// Convert cell value to string
    pub fn as_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::String(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::DateTime(d) => match serial_to_datetime(*d) {
                Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
                None => d.to_string(),
            },
            CellValue::Error(e) => e.clone(),
            CellValue::Formula(f) => f.clone(),
        }
    }

    /// Check if cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Try to convert to float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::DateTime(d) => Some(*d),
            CellValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Interpret a `DateTime` value as a calendar timestamp
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::DateTime(d) => serial_to_datetime(*d),
            _ => None,
        }
    }

    /// Build a `DateTime` value from a calendar timestamp
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(datetime_to_serial(dt))
    }

    /// Short tag naming the variant, used in logs and reports
    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::String(_) => "text",
            CellValue::Number(_) => "number",
            CellValue::Bool(_) => "boolean",
            CellValue::DateTime(_) => "date",
            CellValue::Error(_) => "error",
            CellValue::Formula(_) => "formula",
        }
    }
}

// Serial 0 is 1899-12-30 in the 1900 date system once the leap-year bug is accounted for.
fn excel_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let millis = (serial * 86_400_000.0).round() as i64;
    excel_epoch().checked_add_signed(Duration::milliseconds(millis))
}

fn datetime_to_serial(dt: NaiveDateTime) -> f64 {
    let delta = dt.signed_duration_since(excel_epoch());
    delta.num_milliseconds() as f64 / 86_400_000.0
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Number(i as f64)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Number(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// Represents a cell with the position it was read from
///
/// Empty filler cells inserted during transposition carry the source
/// position they stand in for.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Row index (0-based)
    pub row: u32,
    /// Column index (0-based)
    pub col: u32,
    /// Cell value
    pub value: CellValue,
}

impl Cell {
    /// Create a new cell
    pub fn new(row: u32, col: u32, value: CellValue) -> Self {
        Cell { row, col, value }
    }

    /// Create an explicit empty cell standing in for a position
    pub fn empty(row: u32, col: u32) -> Self {
        Cell::new(row, col, CellValue::Empty)
    }

    /// Get Excel-style cell reference (e.g., "A1", "B2")
    pub fn reference(&self) -> String {
        format!("{}{}", col_to_letter(self.col), self.row + 1)
    }
}

/// Convert column index to Excel letter (0 -> A, 25 -> Z, 26 -> AA)
pub fn col_to_letter(col: u32) -> String {
    let mut result = String::new();
    let mut col = col as u64 + 1;

    while col > 0 {
        col -= 1;
        result.insert(0, (b'A' + (col % 26) as u8) as char);
        col /= 26;
    }

    result
}

/// Rows of cells making up one sheet
///
/// Rows may have different lengths. Each cell keeps the coordinate it had in
/// the source sheet, while its position in the grid is where it will be
/// written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    /// Create an empty grid
    pub fn new() -> Self {
        Grid { rows: Vec::new() }
    }

    /// Wrap already-built rows
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        Grid { rows }
    }

    /// Build a grid from plain values, assigning each cell its position
    pub fn from_values<R, V>(rows: R) -> Self
    where
        R: IntoIterator<Item = V>,
        V: IntoIterator<Item = CellValue>,
    {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(r, row)| {
                row.into_iter()
                    .enumerate()
                    .map(|(c, value)| Cell::new(r as u32, c as u32, value))
                    .collect()
            })
            .collect();
        Grid { rows }
    }

    /// Number of rows
    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row
    pub fn total_cols(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Total number of cells across all rows
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Check if grid has no cells at all
    pub fn is_empty(&self) -> bool {
        self.cell_count() == 0
    }

    /// Get row at index
    pub fn row(&self, index: usize) -> Option<&[Cell]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Get cell at (row, col) grid position
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// All rows
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Push a row at the end
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Values only, dropping source coordinates
    pub fn values(&self) -> Vec<Vec<CellValue>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|c| c.value.clone()).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_reference() {
        let cell = Cell::new(0, 0, CellValue::Empty);
        assert_eq!(cell.reference(), "A1");

        let cell = Cell::new(0, 25, CellValue::Empty);
        assert_eq!(cell.reference(), "Z1");

        let cell = Cell::new(9, 26, CellValue::Empty);
        assert_eq!(cell.reference(), "AA10");
    }

    #[test]
    fn test_cell_value_conversions() {
        let val = CellValue::from(42i64);
        assert_eq!(val, CellValue::Number(42.0));
        assert_eq!(val.as_f64(), Some(42.0));

        assert_eq!(CellValue::Bool(true).as_string(), "TRUE");
        assert_eq!(CellValue::Formula("=A1".into()).kind(), "formula");
    }

    #[test]
    fn test_datetime_serial() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let value = CellValue::from_datetime(dt);
        assert_eq!(value, CellValue::DateTime(45306.5));
        assert_eq!(value.as_datetime(), Some(dt));
        assert_eq!(value.as_string(), "2024-01-15 12:00:00");
    }

    #[test]
    fn test_grid_dimensions_jagged() {
        let grid = Grid::from_values(vec![
            vec![CellValue::from(1i64), CellValue::from(2i64), CellValue::from(3i64)],
            vec![CellValue::from(4i64)],
        ]);
        assert_eq!(grid.total_rows(), 2);
        assert_eq!(grid.total_cols(), 3);
        assert_eq!(grid.cell_count(), 4);
        assert_eq!(grid.get(1, 0).map(|c| (c.row, c.col)), Some((1, 0)));
        assert!(grid.get(1, 1).is_none());
    }
}
