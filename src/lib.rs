//! # xltranspose
//!
//! Partial transpose of spreadsheet sheets: rows and columns are swapped
//! inside a region starting at a given row and column, while the rows above
//! and the columns to the left of that region stay where they are.
//!
//! ## Features
//!
//! - **Region-bounded**: leading rows and columns are kept as-is
//! - **Jagged rows**: short rows are never padded unless asked to
//! - **Typed cells**: text, numbers, booleans, dates, errors, and formulas survive the round trip
//! - **Multiple formats**: reads XLSX, XLS, and ODS; writes XLSX
//! - **No partial output**: files are written atomically, and only after every check passed
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use xltranspose::{transpose_file, TransposeConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Keep the header row and the label column, transpose the rest
//! let config = TransposeConfig::builder("sales.xlsx", "sales_by_month.xlsx")
//!     .start_row(1)
//!     .start_col(1)
//!     .build()?;
//!
//! let report = transpose_file(&config)?;
//! println!("{} cells moved", report.cells_transposed);
//! # Ok(())
//! # }
//! ```
//!
//! ### In memory
//!
//! ```rust
//! use xltranspose::{transpose_grid, CellValue, Grid, TransposeConfig};
//!
//! let grid = Grid::from_values(vec![
//!     vec![CellValue::from(1i64), CellValue::from(2i64), CellValue::from(3i64)],
//!     vec![CellValue::from(4i64), CellValue::from(5i64), CellValue::from(6i64)],
//! ]);
//! let config = TransposeConfig::builder("in.xlsx", "out.xlsx")
//!     .start_col(1)
//!     .build()
//!     .unwrap();
//!
//! let out = transpose_grid(&grid, &config).unwrap();
//! assert_eq!(out.grid.values()[0], vec![
//!     CellValue::from(1i64), CellValue::from(2i64), CellValue::from(5i64),
//! ]);
//! ```

pub mod config;
pub mod emit;
pub mod error;
pub mod fast_writer;
pub mod partition;
pub mod pipeline;
pub mod reader;
pub mod reassemble;
pub mod transpose;
pub mod types;
pub mod validate;
pub mod writer;

pub use config::{MissingCellPolicy, PrefixPolicy, SheetSelector, TransposeConfig};
pub use error::{Result, TransposeError};
pub use pipeline::{transpose_file, transpose_grid, Pipeline, TransposeReport};
pub use reader::{ExcelReader, SheetReader};
pub use types::{Cell, CellValue, Grid};
pub use writer::{ExcelWriter, SheetWriter};
