//! Fast xlsx writer optimized for streaming
//!
//! This module provides a low-allocation xlsx writer:
//! - Direct XML generation into the zip entry of the current sheet
//! - Shared strings deduplication
//! - Typed cells: numbers, booleans, dates, errors, formulas, and text
//!
//! [`FastWorkbook`] writes into any `Write + Seek` sink. Files on disk are
//! written through [`crate::writer::ExcelWriter`], which wraps it with an
//! atomic save.
//!
//! # Examples
//!
//! ```
//! use std::io::Cursor;
//! use xltranspose::fast_writer::FastWorkbook;
//! use xltranspose::types::CellValue;
//!
//! let mut workbook = FastWorkbook::new(Cursor::new(Vec::new()));
//! workbook.add_worksheet("Sheet1")?;
//! workbook.write_row(&[CellValue::from("Name"), CellValue::from(30i64)])?;
//! let bytes = workbook.close()?.into_inner();
//! assert!(bytes.starts_with(b"PK"));
//! # Ok::<(), xltranspose::TransposeError>(())
//! ```

pub mod shared_strings;
pub mod workbook;
pub mod worksheet;
pub mod xml_writer;

pub use workbook::{validate_sheet_name, FastWorkbook};
