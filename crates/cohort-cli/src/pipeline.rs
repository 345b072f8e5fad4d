//! Workbook transform pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Ingest**: read and validate the five input sheets
//! 2. **Classify**: derive identifier, gender code, cohort and study number
//! 3. **Join**: copy Demographics and Extra information fields into Study Data
//! 4. **Report**: rebuild the exception list and pivot table
//! 5. **Output**: write the five tables to one xlsx workbook
//!
//! Every stage runs in memory; nothing touches the output path until the
//! last stage, so a failure anywhere leaves no partial file behind.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use cohort_ingest::{SourceWorkbook, read_source_workbook};
use cohort_model::schema::{column, sheet};
use cohort_report::{OutputSheet, RowIndex, write_workbook};
use cohort_transform::{
    ClassificationSummary, ExceptionReport, JoinSummary, StudyNumberAllocator, TypedCells,
    build_exception_report, build_pivot_report, classify_demographics, join_typed_cells,
    populate_study_data,
};
use polars::prelude::DataFrame;
use tracing::{debug, info, info_span};

use crate::logging::redact_value;
use crate::types::{RunResult, SheetSummary};

/// Options for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Run every stage but skip writing the workbook.
    pub dry_run: bool,
}

// ============================================================================
// Stage 1: Ingest
// ============================================================================

/// Read the input workbook.
pub fn ingest(input: &Path) -> Result<SourceWorkbook> {
    let span = info_span!("ingest", path = %input.display());
    let _guard = span.enter();
    read_source_workbook(input).with_context(|| format!("read {}", input.display()))
}

// ============================================================================
// Stage 2: Classify
// ============================================================================

/// Classify Demographics in place with a fresh set of study number counters.
pub fn classify(demographics: &mut DataFrame) -> Result<ClassificationSummary> {
    let span = info_span!("classify", rows = demographics.height());
    let _guard = span.enter();
    let mut allocator = StudyNumberAllocator::new();
    let summary =
        classify_demographics(demographics, &mut allocator).context("classify demographics")?;
    info!(
        rows = summary.rows,
        reformatted = summary.reformatted,
        cohorts = summary.cohorts.len(),
        "demographics classified"
    );
    Ok(summary)
}

// ============================================================================
// Stage 3: Join
// ============================================================================

/// Joined Study Data counts and the typed cells of its mixed columns.
#[derive(Debug)]
pub struct JoinResult {
    pub summary: JoinSummary,
    pub typed_cells: DataFrame,
}

/// Populate Study Data from the classified Demographics and Extra information.
pub fn join(
    demographics: &DataFrame,
    extra_info: &DataFrame,
    study_data: &mut DataFrame,
    cells: TypedCells<'_>,
) -> Result<JoinResult> {
    let span = info_span!("join", rows = study_data.height());
    let _guard = span.enter();
    let summary =
        populate_study_data(demographics, extra_info, study_data).context("populate study data")?;
    let typed_cells = join_typed_cells(demographics, extra_info, study_data, cells)
        .context("carry typed cells into study data")?;
    info!(
        demographic_matches = summary.demographic_matches,
        extra_info_matches = summary.extra_info_matches,
        unmatched = summary.unmatched,
        "study data populated"
    );
    Ok(JoinResult {
        summary,
        typed_cells,
    })
}

// ============================================================================
// Stage 4: Report
// ============================================================================

/// Exception report with the exception list and pivot table as output frames.
#[derive(Debug)]
pub struct ReportResult {
    pub exceptions: ExceptionReport,
    pub exception_frame: DataFrame,
    pub pivot_frame: DataFrame,
}

/// Build the exception list and pivot table from the classified Demographics.
pub fn report(demographics: &DataFrame, extra_info: &DataFrame) -> Result<ReportResult> {
    let span = info_span!("report");
    let _guard = span.enter();
    let exceptions =
        build_exception_report(demographics, extra_info).context("build exception list")?;
    for identifier in &exceptions.missing {
        debug!(
            nric = redact_value(identifier),
            "identifier not found in {}",
            sheet::EXTRA_INFO
        );
    }
    let pivot = build_pivot_report(demographics).context("build pivot table")?;
    let exception_frame = exceptions.to_frame().context("exception list frame")?;
    let pivot_frame = pivot.to_frame().context("pivot table frame")?;
    info!(
        unique = exceptions.unique.len(),
        missing = exceptions.missing.len(),
        pivot_rows = pivot_frame.height(),
        "reports built"
    );
    Ok(ReportResult {
        exceptions,
        exception_frame,
        pivot_frame,
    })
}

// ============================================================================
// Stage 5: Output
// ============================================================================

/// The five tables of the output workbook, in sheet order.
pub struct OutputTables<'a> {
    pub demographics: &'a DataFrame,
    pub extra_info: &'a DataFrame,
    pub study_data: &'a DataFrame,
    pub exception_list: &'a DataFrame,
    pub pivot_table: &'a DataFrame,
    /// Typed cells of the mixed columns of the first three tables.
    pub typed_cells: TypedCells<'a>,
}

fn with_cells<'a>(sheet: OutputSheet<'a>, cells: Option<&'a DataFrame>) -> OutputSheet<'a> {
    match cells {
        Some(cells) => sheet.with_typed_cells(cells),
        None => sheet,
    }
}

impl<'a> OutputTables<'a> {
    fn sheets(&self) -> [OutputSheet<'a>; 5] {
        let cells = self.typed_cells;
        [
            with_cells(
                OutputSheet::new(sheet::DEMOGRAPHICS, self.demographics),
                cells.demographics,
            ),
            with_cells(
                OutputSheet::new(sheet::EXTRA_INFO, self.extra_info),
                cells.extra_info,
            ),
            with_cells(
                OutputSheet::new(sheet::STUDY_DATA, self.study_data),
                cells.study_data,
            ),
            OutputSheet::new(sheet::EXCEPTION_LIST, self.exception_list),
            OutputSheet::new(sheet::PIVOT_TABLE, self.pivot_table)
                .with_index_column(column::PIVOT_LABEL),
        ]
    }

    /// Row and column counts as they appear in the output workbook.
    pub fn summaries(&self) -> Vec<SheetSummary> {
        self.sheets()
            .iter()
            .map(|sheet| SheetSummary {
                name: sheet.name.to_string(),
                rows: sheet.frame.height(),
                columns: match sheet.index {
                    RowIndex::Positional => sheet.frame.width(),
                    RowIndex::Column(_) => sheet.frame.width().saturating_sub(1),
                },
            })
            .collect()
    }
}

/// Write the output workbook.
pub fn write_outputs(path: &Path, tables: &OutputTables<'_>) -> Result<()> {
    let span = info_span!("write", path = %path.display());
    let _guard = span.enter();
    write_workbook(path, &tables.sheets())
        .with_context(|| format!("write output workbook {}", path.display()))
}

/// Run every stage against `options.input`.
///
/// # Errors
///
/// Returns the first stage failure. No output file is written on error.
pub fn run(options: &RunOptions) -> Result<RunResult> {
    let start = Instant::now();
    let SourceWorkbook {
        mut demographics,
        extra_info,
        mut study_data,
        typed_cells,
        ..
    } = ingest(&options.input)?;
    let source_cells = TypedCells {
        demographics: typed_cells.get(sheet::DEMOGRAPHICS),
        extra_info: typed_cells.get(sheet::EXTRA_INFO),
        study_data: typed_cells.get(sheet::STUDY_DATA),
    };

    let classification = classify(&mut demographics)?;
    let joined = join(&demographics, &extra_info, &mut study_data, source_cells)?;
    let reports = report(&demographics, &extra_info)?;

    let tables = OutputTables {
        demographics: &demographics,
        extra_info: &extra_info,
        study_data: &study_data,
        exception_list: &reports.exception_frame,
        pivot_table: &reports.pivot_frame,
        typed_cells: TypedCells {
            study_data: Some(&joined.typed_cells),
            ..source_cells
        },
    };
    let output = if options.dry_run {
        info!("dry run: skipping output");
        None
    } else {
        write_outputs(&options.output, &tables)?;
        Some(options.output.clone())
    };

    debug!(elapsed_ms = start.elapsed().as_millis(), "run complete");
    Ok(RunResult {
        input: options.input.clone(),
        output,
        sheets: tables.summaries(),
        classification,
        join: joined.summary,
        unique_identifiers: reports.exceptions.unique.len(),
        missing_identifiers: reports.exceptions.missing.len(),
    })
}
