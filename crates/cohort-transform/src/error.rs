//! Error types for the transform stages.

use cohort_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    /// A column the stage reads is absent from its sheet.
    #[error("sheet '{sheet}' has no column '{column}'")]
    MissingColumn { sheet: String, column: String },

    /// A single cell could not be classified.
    #[error("sheet '{sheet}' row {row}, column '{column}': {source}")]
    Classification {
        sheet: String,
        row: usize,
        column: String,
        #[source]
        source: ModelError,
    },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;

/// Fail with [`TransformError::MissingColumn`] unless `df` has every column.
pub(crate) fn require_columns(
    df: &polars::prelude::DataFrame,
    sheet: &str,
    columns: &[&str],
) -> Result<()> {
    for column in columns {
        if df.column(column).is_err() {
            return Err(TransformError::MissingColumn {
                sheet: sheet.to_string(),
                column: (*column).to_string(),
            });
        }
    }
    Ok(())
}
