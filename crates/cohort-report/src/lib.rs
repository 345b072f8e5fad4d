//! Output workbook generation.
//!
//! Every table is written to its own sheet with the row index as the leading
//! column, mirroring how the tables were held in memory. Nothing is written
//! to disk until the whole workbook has been assembled. Dates are written as
//! Excel date cells, and typed cells kept for mixed columns are written in
//! place of their text.

mod xlsx;

pub use xlsx::{OutputSheet, RowIndex, build_workbook, write_workbook};
