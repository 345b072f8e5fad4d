use std::path::PathBuf;

use cohort_transform::{ClassificationSummary, JoinSummary};

#[derive(Debug)]
pub struct RunResult {
    pub input: PathBuf,
    /// `None` on a dry run.
    pub output: Option<PathBuf>,
    pub sheets: Vec<SheetSummary>,
    pub classification: ClassificationSummary,
    pub join: JoinSummary,
    pub unique_identifiers: usize,
    pub missing_identifiers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSummary {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
}
