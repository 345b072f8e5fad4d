//! Shared utilities for the cohort workbook crates.
//!
//! This crate provides the Polars value helpers used by ingestion, the
//! transform stages and the workbook writer.

pub mod values;

pub use values::{any_to_i64, any_to_string, column_strings, format_numeric, parse_i64};
