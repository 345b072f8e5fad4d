//! Cohort workbook transformations.
//!
//! This crate provides the in-memory stages of the workbook transform:
//!
//! - **identifier**: canonical `<letter><7 digits><letter>` identifiers
//! - **classify**: gender coding, age cohorts and per-cohort study numbers
//! - **lookup**: first-match row index over a reference table
//! - **join**: copies reference fields into the Study Data table
//! - **report**: exception list and stacked frequency (pivot) report

pub mod classify;
pub mod error;
pub mod identifier;
pub mod join;
pub mod lookup;
pub mod report;

pub use classify::{ClassificationSummary, StudyNumberAllocator, classify_demographics};
pub use error::{Result, TransformError};
pub use identifier::normalize_identifier;
pub use join::{
    DEMOGRAPHIC_FIELDS, EXTRA_INFO_FIELDS, JoinSummary, TypedCells, join_typed_cells,
    populate_study_data,
};
pub use lookup::FirstMatchIndex;
pub use report::{
    ExceptionReport, FrequencyTable, PivotReport, build_exception_report, build_pivot_report,
    frequency_table,
};
