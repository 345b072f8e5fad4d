//! Cross-reference join of Study Data against Demographics and Extra information.
//!
//! Each Study Data row is keyed by its `Old NRIC`, upper-cased. The key is
//! looked up against the raw `NRIC` column of each reference sheet and the
//! first matching row's fields are copied across. A miss leaves the copied
//! fields null; it is never an error.
//!
//! Mixed text and number columns travel as text. Their typed cells are held
//! in separate row-aligned frames, and [`join_typed_cells`] carries them over
//! to the joined columns the same way.

use cohort_common::column_strings;
use cohort_model::schema::{column, sheet};
use polars::prelude::{Column, DataFrame, DataType, IdxCa, IdxSize, NewChunkedArray};
use tracing::{debug, info_span, warn};

use crate::error::{Result, require_columns};
use crate::lookup::FirstMatchIndex;

/// `(source column in Demographics, target column in Study Data)`.
///
/// The joined `Gender` carries the derived gender code.
pub const DEMOGRAPHIC_FIELDS: [(&str, &str); 5] = [
    (column::STUDY_NUMBER, column::STUDY_NUMBER),
    (column::NEW_NRIC, column::NEW_NRIC),
    (column::GENDER_CODE, column::GENDER),
    (column::AGE, column::AGE),
    (column::MARITAL_STATUS, column::MARITAL_STATUS),
];

/// Columns copied verbatim from Extra information.
pub const EXTRA_INFO_FIELDS: [&str; 4] = [
    column::ETHNIC_GROUP,
    column::ADDRESS_1,
    column::ADDRESS_2,
    column::CONTACT_NUMBER,
];

/// Typed cells of mixed columns, each row-aligned with the sheet it came from.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypedCells<'a> {
    pub demographics: Option<&'a DataFrame>,
    pub extra_info: Option<&'a DataFrame>,
    pub study_data: Option<&'a DataFrame>,
}

/// Match counts for one join run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinSummary {
    pub rows: usize,
    pub demographic_matches: usize,
    pub extra_info_matches: usize,
    /// Rows that matched neither reference sheet.
    pub unmatched: usize,
}

/// Matched reference row for every target row, `None` on a miss.
fn match_rows(
    keys: &[Option<String>],
    reference: &DataFrame,
    name: &str,
) -> Result<Vec<Option<IdxSize>>> {
    if reference.column(column::NRIC).is_err() {
        warn!(sheet = name, "reference sheet has no NRIC column; every lookup misses");
        return Ok(vec![None; keys.len()]);
    }
    let index = FirstMatchIndex::build(reference, column::NRIC)?;
    debug!(sheet = name, keys = index.len(), "reference indexed");
    Ok(keys
        .iter()
        .map(|key| key.as_deref().and_then(|key| index.get(&key.to_uppercase())))
        .collect())
}

/// Gather `source` from `reference` at `rows` as a new column named `target`.
fn gather(
    reference: &DataFrame,
    name: &str,
    source: &str,
    target: &str,
    rows: &[Option<IdxSize>],
) -> Result<Column> {
    let Ok(values) = reference.column(source) else {
        warn!(
            sheet = name,
            column = source,
            "reference column missing; filling with nulls"
        );
        return Ok(Column::full_null(target.into(), rows.len(), &DataType::String));
    };
    let indices = IdxCa::from_iter_options("row".into(), rows.iter().copied());
    Ok(values.take(&indices)?.with_name(target.into()))
}

/// Copy reference fields into `study_data`.
///
/// Nine columns are added after the existing ones, in the order of
/// [`DEMOGRAPHIC_FIELDS`] then [`EXTRA_INFO_FIELDS`]. A joined column whose
/// name already exists in `study_data` replaces it in place. Row count and
/// order are unchanged.
///
/// # Errors
///
/// Returns [`TransformError::MissingColumn`](crate::TransformError::MissingColumn)
/// if `study_data` has no `Old NRIC` column.
pub fn populate_study_data(
    demographics: &DataFrame,
    extra_info: &DataFrame,
    study_data: &mut DataFrame,
) -> Result<JoinSummary> {
    let span = info_span!("populate_study_data", rows = study_data.height());
    let _guard = span.enter();

    require_columns(study_data, sheet::STUDY_DATA, &[column::OLD_NRIC])?;
    let keys = column_strings(study_data, column::OLD_NRIC)?;

    let demographic_rows = match_rows(&keys, demographics, sheet::DEMOGRAPHICS)?;
    let extra_rows = match_rows(&keys, extra_info, sheet::EXTRA_INFO)?;

    let mut joined = Vec::with_capacity(DEMOGRAPHIC_FIELDS.len() + EXTRA_INFO_FIELDS.len());
    for (source, target) in DEMOGRAPHIC_FIELDS {
        joined.push(gather(
            demographics,
            sheet::DEMOGRAPHICS,
            source,
            target,
            &demographic_rows,
        )?);
    }
    for field in EXTRA_INFO_FIELDS {
        joined.push(gather(extra_info, sheet::EXTRA_INFO, field, field, &extra_rows)?);
    }
    for column in joined {
        study_data.with_column(column)?;
    }

    let mut summary = JoinSummary {
        rows: keys.len(),
        ..JoinSummary::default()
    };
    for (demo, extra) in demographic_rows.iter().zip(&extra_rows) {
        if demo.is_some() {
            summary.demographic_matches += 1;
        }
        if extra.is_some() {
            summary.extra_info_matches += 1;
        }
        if demo.is_none() && extra.is_none() {
            summary.unmatched += 1;
        }
    }
    debug!(
        demographic_matches = summary.demographic_matches,
        extra_info_matches = summary.extra_info_matches,
        unmatched = summary.unmatched,
        "study data joined"
    );
    Ok(summary)
}

/// Typed cells for `study_data` after [`populate_study_data`] has run.
///
/// Columns of `cells.study_data` survive unless a joined column replaced
/// them. Each joined column whose source has typed cells gets them gathered
/// from the same matched rows. The result is row-aligned with `study_data`.
///
/// # Errors
///
/// Returns [`TransformError::MissingColumn`](crate::TransformError::MissingColumn)
/// if `study_data` has no `Old NRIC` column.
pub fn join_typed_cells(
    demographics: &DataFrame,
    extra_info: &DataFrame,
    study_data: &DataFrame,
    cells: TypedCells<'_>,
) -> Result<DataFrame> {
    require_columns(study_data, sheet::STUDY_DATA, &[column::OLD_NRIC])?;
    let keys = column_strings(study_data, column::OLD_NRIC)?;

    let joined_targets: Vec<&str> = DEMOGRAPHIC_FIELDS
        .iter()
        .map(|(_, target)| *target)
        .chain(EXTRA_INFO_FIELDS)
        .collect();
    let mut columns: Vec<Column> = cells
        .study_data
        .map(|frame| {
            frame
                .get_columns()
                .iter()
                .filter(|column| !joined_targets.contains(&column.name().as_str()))
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    let demographic_fields = DEMOGRAPHIC_FIELDS.to_vec();
    let extra_fields: Vec<(&str, &str)> = EXTRA_INFO_FIELDS.iter().map(|f| (*f, *f)).collect();
    let sources = [
        (demographics, cells.demographics, sheet::DEMOGRAPHICS, demographic_fields),
        (extra_info, cells.extra_info, sheet::EXTRA_INFO, extra_fields),
    ];
    for (reference, typed, name, fields) in sources {
        let Some(typed) = typed else { continue };
        let fields: Vec<(&str, &str)> = fields
            .into_iter()
            .filter(|(source, _)| typed.column(source).is_ok())
            .collect();
        if fields.is_empty() || reference.column(column::NRIC).is_err() {
            continue;
        }
        let rows = match_rows(&keys, reference, name)?;
        for (source, target) in fields {
            columns.push(gather(typed, name, source, target, &rows)?);
        }
    }
    Ok(DataFrame::new(columns)?)
}
