//! Exception list and pivot (frequency) report.
//!
//! # Ordering
//!
//! - Unique identifiers keep first-seen order.
//! - Identifiers missing from Extra information are sorted lexicographically.
//! - Frequency entries are sorted by count, highest first; equal counts keep
//!   the order in which the value first appears.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use cohort_common::column_strings;
use cohort_model::schema::{column, sheet};
use polars::prelude::{Column, DataFrame};
use tracing::{debug, info_span};

use crate::error::{Result, require_columns};

/// Two independent identifier lists, placed side by side in the output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionReport {
    /// Distinct `New NRIC` values in first-seen order.
    pub unique: Vec<String>,
    /// Raw Demographics `NRIC` values absent from Extra information.
    pub missing: Vec<String>,
}

impl ExceptionReport {
    /// Two-column frame; the shorter list is padded with nulls.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let height = self.unique.len().max(self.missing.len());
        let pad = |values: &[String]| -> Vec<Option<String>> {
            let mut padded: Vec<Option<String>> = values.iter().cloned().map(Some).collect();
            padded.resize(height, None);
            padded
        };
        Ok(DataFrame::new(vec![
            Column::new(column::UNIQUE_NRIC.into(), pad(&self.unique)),
            Column::new(column::MISSING_NRIC.into(), pad(&self.missing)),
        ])?)
    }
}

/// Build the exception report from the classified Demographics sheet.
///
/// # Errors
///
/// Returns an error if Demographics lacks `NRIC` or `New NRIC`, or Extra
/// information lacks `NRIC`.
pub fn build_exception_report(
    demographics: &DataFrame,
    extra_info: &DataFrame,
) -> Result<ExceptionReport> {
    require_columns(
        demographics,
        sheet::DEMOGRAPHICS,
        &[column::NRIC, column::NEW_NRIC],
    )?;
    require_columns(extra_info, sheet::EXTRA_INFO, &[column::NRIC])?;

    let mut seen = BTreeSet::new();
    let unique: Vec<String> = column_strings(demographics, column::NEW_NRIC)?
        .into_iter()
        .flatten()
        .filter(|value| seen.insert(value.clone()))
        .collect();

    let known: BTreeSet<String> = column_strings(extra_info, column::NRIC)?
        .into_iter()
        .flatten()
        .collect();
    let missing: Vec<String> = column_strings(demographics, column::NRIC)?
        .into_iter()
        .flatten()
        .filter(|value| !known.contains(value))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    debug!(
        unique = unique.len(),
        missing = missing.len(),
        "exception list built"
    );
    Ok(ExceptionReport { unique, missing })
}

/// Row counts per distinct value of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    /// Column the counts were taken from; also the section header.
    pub name: String,
    pub entries: Vec<(String, u32)>,
}

impl FrequencyTable {
    pub fn total(&self) -> u32 {
        self.entries.iter().map(|(_, count)| count).sum()
    }
}

/// Count rows per distinct non-null value of `column_name`.
///
/// # Errors
///
/// Returns [`TransformError::MissingColumn`](crate::TransformError::MissingColumn)
/// if the column is absent.
pub fn frequency_table(
    df: &DataFrame,
    sheet_name: &str,
    column_name: &str,
) -> Result<FrequencyTable> {
    require_columns(df, sheet_name, &[column_name])?;
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut entries: Vec<(String, u32)> = Vec::new();
    for value in column_strings(df, column_name)?.into_iter().flatten() {
        match positions.get(&value) {
            Some(&idx) => entries[idx].1 += 1,
            None => {
                positions.insert(value.clone(), entries.len());
                entries.push((value, 1));
            }
        }
    }
    // Stable sort keeps first-seen order among equal counts.
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(FrequencyTable {
        name: column_name.to_string(),
        entries,
    })
}

/// Frequency tables stacked in a fixed order, each under a header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PivotReport {
    pub sections: Vec<FrequencyTable>,
}

impl PivotReport {
    /// Label/count frame. Section header rows carry the table name and a null
    /// count.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut labels: Vec<String> = Vec::new();
        let mut counts: Vec<Option<i64>> = Vec::new();
        for section in &self.sections {
            labels.push(section.name.clone());
            counts.push(None);
            for (label, count) in &section.entries {
                labels.push(label.clone());
                counts.push(Some(i64::from(*count)));
            }
        }
        Ok(DataFrame::new(vec![
            Column::new(column::PIVOT_LABEL.into(), labels),
            Column::new(column::PIVOT_COUNT.into(), counts),
        ])?)
    }
}

impl fmt::Display for PivotReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            writeln!(f, "[{}]", section.name)?;
            for (label, count) in &section.entries {
                writeln!(f, "{label} = {count}")?;
            }
        }
        Ok(())
    }
}

/// Build the pivot report (Age Group, Gender, Marital Status) from the
/// classified Demographics sheet.
///
/// # Errors
///
/// Returns an error if any of the three columns is missing.
pub fn build_pivot_report(demographics: &DataFrame) -> Result<PivotReport> {
    let span = info_span!("pivot", rows = demographics.height());
    let _guard = span.enter();

    let sections = [column::AGE_GROUP, column::GENDER, column::MARITAL_STATUS]
        .into_iter()
        .map(|name| frequency_table(demographics, sheet::DEMOGRAPHICS, name))
        .collect::<Result<Vec<_>>>()?;
    Ok(PivotReport { sections })
}
