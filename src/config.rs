//! Job configuration
//!
//! A [`TransposeConfig`] is built once through [`TransposeConfigBuilder`],
//! validated in `build()`, and never mutated afterwards.

use crate::error::{Result, TransposeError};
use crate::fast_writer::validate_sheet_name;
use crate::validate::check_index;
use std::path::{Path, PathBuf};

/// Which sheet of the input workbook to transpose
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    /// Sheet by position (0-based)
    Index(usize),
    /// Sheet by name
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(0)
    }
}

impl std::fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetSelector::Index(i) => write!(f, "index {}", i),
            SheetSelector::Name(n) => write!(f, "'{}'", n),
        }
    }
}

/// What to do with positions a jagged region does not fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MissingCellPolicy {
    /// Absent cells are left out; later cells of a transposed row move up
    #[default]
    Skip,
    /// Absent cells followed by real ones become explicit empty cells
    PadEmpty,
}

/// How prefix columns are attached to transposed rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrefixPolicy {
    /// Output row `start_row + c` takes the prefix of source row `start_row + c`,
    /// or no prefix when that source row does not exist
    #[default]
    OriginalRow,
    /// Like `OriginalRow`, padding short prefixes with empty cells so
    /// transposed data always begins at `start_col`
    OriginalRowPadded,
}

/// Immutable description of one transposition job
#[derive(Debug, Clone, PartialEq)]
pub struct TransposeConfig {
    start_row: usize,
    start_col: usize,
    input_path: PathBuf,
    output_path: PathBuf,
    sheet: SheetSelector,
    output_sheet_name: Option<String>,
    missing_cells: MissingCellPolicy,
    prefix_policy: PrefixPolicy,
}

impl TransposeConfig {
    /// Start building a config for `input` -> `output`
    ///
    /// # Examples
    ///
    /// ```
    /// use xltranspose::config::TransposeConfig;
    ///
    /// let config = TransposeConfig::builder("in.xlsx", "out.xlsx")
    ///     .start_row(1)
    ///     .start_col(2)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.start_row(), 1);
    /// ```
    pub fn builder<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> TransposeConfigBuilder {
        TransposeConfigBuilder::new(input, output)
    }

    /// Config that transposes the whole first sheet
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<Self> {
        TransposeConfigBuilder::new(input, output).build()
    }

    /// Load a config from `XLTRANSPOSE_*` environment variables
    ///
    /// `XLTRANSPOSE_INPUT` and `XLTRANSPOSE_OUTPUT` are required.
    /// `XLTRANSPOSE_START_ROW` / `XLTRANSPOSE_START_COL` default to 0 and
    /// `XLTRANSPOSE_SHEET` selects a sheet by name.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let input = lookup("XLTRANSPOSE_INPUT")
            .ok_or_else(|| TransposeError::invalid_config("input_path", "XLTRANSPOSE_INPUT is not set"))?;
        let output = lookup("XLTRANSPOSE_OUTPUT").ok_or_else(|| {
            TransposeError::invalid_config("output_path", "XLTRANSPOSE_OUTPUT is not set")
        })?;

        let mut builder = TransposeConfigBuilder::new(input, output);
        if let Some(raw) = lookup("XLTRANSPOSE_START_ROW") {
            builder = builder.start_row(parse_index("start_row", &raw)?);
        }
        if let Some(raw) = lookup("XLTRANSPOSE_START_COL") {
            builder = builder.start_col(parse_index("start_col", &raw)?);
        }
        if let Some(name) = lookup("XLTRANSPOSE_SHEET") {
            builder = builder.sheet(SheetSelector::Name(name));
        }
        builder.build()
    }

    pub fn start_row(&self) -> usize {
        self.start_row
    }

    pub fn start_col(&self) -> usize {
        self.start_col
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn sheet(&self) -> &SheetSelector {
        &self.sheet
    }

    /// Sheet name for the output workbook, if one was set explicitly
    pub fn output_sheet_name(&self) -> Option<&str> {
        self.output_sheet_name.as_deref()
    }

    pub fn missing_cells(&self) -> MissingCellPolicy {
        self.missing_cells
    }

    pub fn prefix_policy(&self) -> PrefixPolicy {
        self.prefix_policy
    }
}

fn parse_index(field: &'static str, raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|e| TransposeError::invalid_config(field, format!("'{}': {}", raw, e)))
}

/// Builder for [`TransposeConfig`]
///
/// Indices are taken as signed values so callers holding raw user input can
/// pass it straight through; negatives are rejected by `build()`.
#[derive(Debug, Clone)]
pub struct TransposeConfigBuilder {
    start_row: i64,
    start_col: i64,
    input_path: PathBuf,
    output_path: PathBuf,
    sheet: SheetSelector,
    output_sheet_name: Option<String>,
    missing_cells: MissingCellPolicy,
    prefix_policy: PrefixPolicy,
}

impl TransposeConfigBuilder {
    /// Create a new builder
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Self {
        TransposeConfigBuilder {
            start_row: 0,
            start_col: 0,
            input_path: input.as_ref().to_path_buf(),
            output_path: output.as_ref().to_path_buf(),
            sheet: SheetSelector::default(),
            output_sheet_name: None,
            missing_cells: MissingCellPolicy::default(),
            prefix_policy: PrefixPolicy::default(),
        }
    }

    /// Set the first row (0-based) of the transposable region
    pub fn start_row(mut self, index: i64) -> Self {
        self.start_row = index;
        self
    }

    /// Set the first column (0-based) of the transposable region
    pub fn start_col(mut self, index: i64) -> Self {
        self.start_col = index;
        self
    }

    /// Select the input sheet
    pub fn sheet(mut self, sheet: SheetSelector) -> Self {
        self.sheet = sheet;
        self
    }

    /// Name the sheet in the output workbook
    pub fn output_sheet_name(mut self, name: &str) -> Self {
        self.output_sheet_name = Some(name.to_string());
        self
    }

    pub fn missing_cells(mut self, policy: MissingCellPolicy) -> Self {
        self.missing_cells = policy;
        self
    }

    pub fn prefix_policy(mut self, policy: PrefixPolicy) -> Self {
        self.prefix_policy = policy;
        self
    }

    /// Validate and build the config
    pub fn build(self) -> Result<TransposeConfig> {
        let start_row = check_index("start_row", self.start_row)?;
        let start_col = check_index("start_col", self.start_col)?;

        if self.input_path.as_os_str().is_empty() {
            return Err(TransposeError::invalid_config("input_path", "path is empty"));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(TransposeError::invalid_config("output_path", "path is empty"));
        }
        if let Some(name) = &self.output_sheet_name {
            validate_sheet_name(name)?;
        }

        Ok(TransposeConfig {
            start_row,
            start_col,
            input_path: self.input_path,
            output_path: self.output_path,
            sheet: self.sheet,
            output_sheet_name: self.output_sheet_name,
            missing_cells: self.missing_cells,
            prefix_policy: self.prefix_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_transpose_whole_sheet() {
        let config = TransposeConfig::new("in.xlsx", "out.xlsx").unwrap();
        assert_eq!(config.start_row(), 0);
        assert_eq!(config.start_col(), 0);
        assert_eq!(config.sheet(), &SheetSelector::Index(0));
        assert_eq!(config.missing_cells(), MissingCellPolicy::Skip);
        assert_eq!(config.prefix_policy(), PrefixPolicy::OriginalRow);
    }

    #[test]
    fn test_negative_indices_rejected() {
        let err = TransposeConfig::builder("in.xlsx", "out.xlsx")
            .start_col(-3)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            TransposeError::InvalidConfig {
                field: "start_col",
                ..
            }
        ));
    }

    #[test]
    fn test_empty_paths_rejected() {
        assert!(TransposeConfig::new("", "out.xlsx").is_err());
        assert!(TransposeConfig::new("in.xlsx", "").is_err());
    }

    #[test]
    fn test_output_sheet_name_checked() {
        let result = TransposeConfig::builder("in.xlsx", "out.xlsx")
            .output_sheet_name("a[1]")
            .build();
        assert!(matches!(
            result,
            Err(TransposeError::InvalidConfig {
                field: "sheet_name",
                ..
            })
        ));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("XLTRANSPOSE_INPUT", "a.xlsx"),
            ("XLTRANSPOSE_OUTPUT", "b.xlsx"),
            ("XLTRANSPOSE_START_ROW", "2"),
            ("XLTRANSPOSE_SHEET", "Data"),
        ]
        .into_iter()
        .collect();

        let config =
            TransposeConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.start_row(), 2);
        assert_eq!(config.start_col(), 0);
        assert_eq!(config.input_path(), Path::new("a.xlsx"));
        assert_eq!(config.sheet(), &SheetSelector::Name("Data".to_string()));
    }

    #[test]
    fn test_from_lookup_bad_index() {
        let err = TransposeConfig::from_lookup(|k| match k {
            "XLTRANSPOSE_INPUT" => Some("a.xlsx".into()),
            "XLTRANSPOSE_OUTPUT" => Some("b.xlsx".into()),
            "XLTRANSPOSE_START_COL" => Some("-1".into()),
            _ => None,
        })
        .unwrap_err();
        assert!(matches!(
            err,
            TransposeError::InvalidConfig {
                field: "start_col",
                ..
            }
        ));
    }
}
