//! Demographic classification.
//!
//! Adds the four derived columns to the Demographics sheet:
//!
//! | column            | derived from | rule                                   |
//! |-------------------|--------------|----------------------------------------|
//! | `New NRIC`        | `NRIC`       | [`normalize_identifier`]               |
//! | `Coding - Gender` | `Gender`     | `F` = 1, `M` = 2                       |
//! | `Age Group`       | `Age`        | ten-year bucket, 90+ is `G0`           |
//! | `Study Number`    | `Age Group`  | `"<cohort> - <n>"`, `n` counts per cohort |
//!
//! Study numbers encode row order, so the table is walked top to bottom and
//! the counters are owned by a [`StudyNumberAllocator`] created for the run.

use std::collections::BTreeMap;

use cohort_common::{any_to_i64, any_to_string, column_strings};
use cohort_model::schema::{column, sheet};
use cohort_model::{AgeCohort, Gender, ModelError, StudyNumber};
use polars::prelude::{AnyValue, Column, DataFrame};
use tracing::{debug, info_span};

use crate::error::{Result, TransformError, require_columns};
use crate::identifier::normalize_identifier;

/// Per-cohort study number counters.
///
/// Every cohort starts at 1; each call to [`allocate`](Self::allocate) hands out the
/// current value for that cohort and advances it.
#[derive(Debug, Clone)]
pub struct StudyNumberAllocator {
    counters: [u32; AgeCohort::ALL.len()],
}

impl Default for StudyNumberAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl StudyNumberAllocator {
    pub fn new() -> Self {
        Self {
            counters: [1; AgeCohort::ALL.len()],
        }
    }

    /// Assign the next study number in `cohort`.
    pub fn allocate(&mut self, cohort: AgeCohort) -> StudyNumber {
        let counter = &mut self.counters[cohort.index()];
        let number = StudyNumber::new(cohort, *counter);
        *counter += 1;
        number
    }

    /// How many numbers have been handed out in `cohort`.
    pub fn assigned(&self, cohort: AgeCohort) -> u32 {
        self.counters[cohort.index()] - 1
    }
}

/// Counts gathered while classifying the Demographics sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationSummary {
    pub rows: usize,
    /// Rows whose identifier needed more than upper-casing.
    pub reformatted: usize,
    /// Subjects per cohort, for cohorts with at least one subject.
    pub cohorts: BTreeMap<AgeCohort, u32>,
}

fn cell_error(row: usize, column: &str, source: ModelError) -> TransformError {
    TransformError::Classification {
        sheet: sheet::DEMOGRAPHICS.to_string(),
        row,
        column: column.to_string(),
        source,
    }
}

fn normalized_identifiers(df: &DataFrame) -> Result<(Vec<String>, usize)> {
    let mut reformatted = 0usize;
    let mut normalized = Vec::with_capacity(df.height());
    for (row, raw) in column_strings(df, column::NRIC)?.into_iter().enumerate() {
        let raw = raw.unwrap_or_default();
        let value = normalize_identifier(&raw).map_err(|err| cell_error(row, column::NRIC, err))?;
        if value != raw.to_uppercase() {
            reformatted += 1;
        }
        normalized.push(value);
    }
    Ok((normalized, reformatted))
}

fn gender_codes(df: &DataFrame) -> Result<Vec<i64>> {
    column_strings(df, column::GENDER)?
        .into_iter()
        .enumerate()
        .map(|(row, raw)| {
            raw.unwrap_or_default()
                .parse::<Gender>()
                .map(|gender| gender.code())
                .map_err(|err| cell_error(row, column::GENDER, err))
        })
        .collect()
}

fn age_cohorts(df: &DataFrame) -> Result<Vec<AgeCohort>> {
    let ages = df.column(column::AGE)?;
    let mut cohorts = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let value = ages.get(row).unwrap_or(AnyValue::Null);
        let cohort = match any_to_i64(value.clone()) {
            Some(age) => AgeCohort::from_age(age),
            None => Err(ModelError::InvalidAge {
                value: any_to_string(value),
            }),
        }
        .map_err(|err| cell_error(row, column::AGE, err))?;
        cohorts.push(cohort);
    }
    Ok(cohorts)
}

/// Derive `New NRIC`, `Coding - Gender`, `Age Group` and `Study Number`.
///
/// Columns are derived one at a time in that order, so the first failing
/// column decides which error is reported.
///
/// # Errors
///
/// Returns [`TransformError::MissingColumn`] if `NRIC`, `Gender` or `Age` is
/// absent, and [`TransformError::Classification`] for the first malformed
/// identifier, unrecognized gender or invalid age.
pub fn classify_demographics(
    df: &mut DataFrame,
    allocator: &mut StudyNumberAllocator,
) -> Result<ClassificationSummary> {
    let span = info_span!("classify_demographics", rows = df.height());
    let _guard = span.enter();

    require_columns(
        df,
        sheet::DEMOGRAPHICS,
        &[column::NRIC, column::GENDER, column::AGE],
    )?;

    let (identifiers, reformatted) = normalized_identifiers(df)?;
    let codes = gender_codes(df)?;
    let cohorts = age_cohorts(df)?;

    let mut counts: BTreeMap<AgeCohort, u32> = BTreeMap::new();
    let study_numbers: Vec<String> = cohorts
        .iter()
        .map(|cohort| {
            *counts.entry(*cohort).or_insert(0) += 1;
            allocator.allocate(*cohort).to_string()
        })
        .collect();
    let labels: Vec<&str> = cohorts.iter().map(AgeCohort::label).collect();

    df.with_column(Column::new(column::NEW_NRIC.into(), identifiers))?;
    df.with_column(Column::new(column::GENDER_CODE.into(), codes))?;
    df.with_column(Column::new(column::AGE_GROUP.into(), labels))?;
    df.with_column(Column::new(column::STUDY_NUMBER.into(), study_numbers))?;

    debug!(reformatted, cohorts = counts.len(), "demographics classified");

    Ok(ClassificationSummary {
        rows: df.height(),
        reformatted,
        cohorts: counts,
    })
}
