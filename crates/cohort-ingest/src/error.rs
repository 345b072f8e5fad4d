//! Error types for workbook ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading the input workbook.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Workbook file not found.
    #[error("workbook not found: {path}")]
    FileNotFound { path: PathBuf },

    // === Workbook Errors ===
    /// The file could not be opened as a spreadsheet.
    #[error("failed to open workbook {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// One or more required sheets are absent.
    #[error("workbook {path} is missing sheet(s): {}", .sheets.join(", "))]
    MissingSheets { path: PathBuf, sheets: Vec<String> },

    /// A sheet exists but its cells could not be read.
    #[error("failed to read sheet '{sheet}' in {path}: {source}")]
    SheetRead {
        path: PathBuf,
        sheet: String,
        #[source]
        source: calamine::Error,
    },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("Technical Test.xls"),
        };
        assert_eq!(err.to_string(), "workbook not found: Technical Test.xls");
    }

    #[test]
    fn test_missing_sheets_display() {
        let err = IngestError::MissingSheets {
            path: PathBuf::from("in.xlsx"),
            sheets: vec!["Study Data".to_string(), "Pivot Table".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "workbook in.xlsx is missing sheet(s): Study Data, Pivot Table"
        );
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("NRIC".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
    }
}
