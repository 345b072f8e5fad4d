//! Cohort workbook ingestion.
//!
//! Reads the multi-sheet input spreadsheet (xls, xlsx, xlsb or ods) and turns
//! each required sheet into a Polars `DataFrame`. The first non-blank row of a
//! sheet is its header; fully blank rows are skipped; column types are
//! inferred from the cell values. Columns mixing text with numbers or dates
//! are held as text, and their typed cells are kept alongside so they can be
//! written back unchanged.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use cohort_ingest::read_source_workbook;
//!
//! let workbook = read_source_workbook(Path::new("Technical Test.xls"))?;
//! println!("{} demographic rows", workbook.demographics.height());
//! ```

mod error;
mod sheet;
mod workbook;

// === Error Types ===
pub use error::{IngestError, Result};

// === Sheet Conversion ===
pub use sheet::{SheetTable, frame_from_rows, normalize_header, table_from_rows};

// === Workbook Reading ===
pub use workbook::{SourceWorkbook, read_sheet, read_source_workbook};
