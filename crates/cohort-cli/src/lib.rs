//! Library components of the cohort workbook transform CLI.

pub mod logging;
pub mod pipeline;
pub mod types;
