use std::fmt;

use crate::enums::AgeCohort;

/// Cohort-scoped sequential label, rendered as `"<cohort> - <n>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StudyNumber {
    pub cohort: AgeCohort,
    pub sequence: u32,
}

impl StudyNumber {
    pub fn new(cohort: AgeCohort, sequence: u32) -> Self {
        Self { cohort, sequence }
    }
}

impl fmt::Display for StudyNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.cohort, self.sequence)
    }
}
