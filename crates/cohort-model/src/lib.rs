//! Data model for the cohort study workbook.
//!
//! - **schema**: sheet names, column names and default file names
//! - **enums**: `Gender` and `AgeCohort` with their total mappings
//! - **study_number**: the cohort-scoped study number label
//! - **error**: classification errors shared by the transform stages

pub mod enums;
pub mod error;
pub mod schema;
pub mod study_number;

pub use enums::{AgeCohort, Gender};
pub use error::{ModelError, Result};
pub use study_number::StudyNumber;
