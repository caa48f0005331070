//! Error types for xltranspose

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for transposition operations
pub type Result<T> = std::result::Result<T, TransposeError>;

/// Grid axis an index refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Row => f.write_str("row"),
            Axis::Column => f.write_str("column"),
        }
    }
}

/// Main error type for all transposition jobs
#[derive(Error, Debug)]
pub enum TransposeError {
    /// A configuration value was rejected before any file was touched
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// A start index lies past the sheet's extent
    #[error("Start {axis} index {index} is out of bounds (sheet has {extent} {axis}s)")]
    OutOfBounds {
        axis: Axis,
        index: usize,
        extent: usize,
    },

    /// Input resource does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Input resource exists but could not be opened or parsed
    #[error("Unreadable spreadsheet '{}': {reason}", path.display())]
    UnreadableFormat { path: PathBuf, reason: String },

    /// Output could not be written
    #[error("Failed to write '{}': {reason}", path.display())]
    WriteError { path: PathBuf, reason: String },

    /// Output would overwrite the input
    #[error("Output path resolves to the input file: {}", .0.display())]
    PathConflict(PathBuf),

    /// Internal consistency check failed
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransposeError {
    pub(crate) fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        TransposeError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn write_error(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        TransposeError::WriteError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for TransposeError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => TransposeError::Io(e),
            other => TransposeError::Internal(format!("zip: {}", other)),
        }
    }
}
