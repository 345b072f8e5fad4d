//! Workbook loading.

use std::collections::BTreeMap;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};
use cohort_model::schema::sheet;
use polars::prelude::DataFrame;
use tracing::{debug, info};

use crate::error::{IngestError, Result};
use crate::sheet::{SheetTable, table_from_rows};

/// The five sheets of the input workbook.
#[derive(Debug, Clone)]
pub struct SourceWorkbook {
    pub path: PathBuf,
    pub demographics: DataFrame,
    pub extra_info: DataFrame,
    pub study_data: DataFrame,
    /// Loaded for completeness; the exception report is rebuilt from scratch.
    pub exception_list: DataFrame,
    /// Loaded for completeness; the pivot report is rebuilt from scratch.
    pub pivot_table: DataFrame,
    /// [`SheetTable::typed_cells`] by sheet name, for sheets with mixed columns.
    pub typed_cells: BTreeMap<String, DataFrame>,
}

impl SourceWorkbook {
    /// Typed cells of the mixed columns of `sheet`, if it has any.
    pub fn typed_cells(&self, sheet: &str) -> Option<&DataFrame> {
        self.typed_cells.get(sheet)
    }
}

/// Read one sheet of an open workbook into a [`SheetTable`].
///
/// # Errors
///
/// Returns [`IngestError::SheetRead`] when the sheet cannot be decoded.
pub fn read_sheet<R, RS>(workbook: &mut R, path: &Path, name: &str) -> Result<SheetTable>
where
    RS: Read + Seek,
    R: Reader<RS, Error = calamine::Error>,
{
    let range = workbook
        .worksheet_range(name)
        .map_err(|source| IngestError::SheetRead {
            path: path.to_path_buf(),
            sheet: name.to_string(),
            source,
        })?;
    let rows: Vec<Vec<Data>> = range.rows().map(<[Data]>::to_vec).collect();
    let table = table_from_rows(&rows)?;
    debug!(
        sheet = name,
        rows = table.frame.height(),
        columns = table.frame.width(),
        mixed_columns = table.typed_cells.width(),
        "sheet loaded"
    );
    Ok(table)
}

/// Open the input workbook and load every required sheet.
///
/// All sheets are checked up front so a missing sheet is reported before
/// any cell is decoded.
///
/// # Errors
///
/// Returns an error if the file is absent, is not a readable spreadsheet, or
/// lacks any of the sheets in [`sheet::ALL`].
pub fn read_source_workbook(path: &Path) -> Result<SourceWorkbook> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut workbook = open_workbook_auto(path).map_err(|source| IngestError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let available = workbook.sheet_names();
    let missing: Vec<String> = sheet::ALL
        .iter()
        .filter(|name| !available.iter().any(|sheet| sheet == *name))
        .map(|name| (*name).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(IngestError::MissingSheets {
            path: path.to_path_buf(),
            sheets: missing,
        });
    }

    let mut typed_cells = BTreeMap::new();
    let mut load = |name: &str| -> Result<DataFrame> {
        let table = read_sheet(&mut workbook, path, name)?;
        if table.typed_cells.width() > 0 {
            typed_cells.insert(name.to_string(), table.typed_cells);
        }
        Ok(table.frame)
    };
    let demographics = load(sheet::DEMOGRAPHICS)?;
    let extra_info = load(sheet::EXTRA_INFO)?;
    let study_data = load(sheet::STUDY_DATA)?;
    let exception_list = load(sheet::EXCEPTION_LIST)?;
    let pivot_table = load(sheet::PIVOT_TABLE)?;

    info!(
        path = %path.display(),
        demographics = demographics.height(),
        extra_info = extra_info.height(),
        study_data = study_data.height(),
        "workbook loaded"
    );

    Ok(SourceWorkbook {
        path: path.to_path_buf(),
        demographics,
        extra_info,
        study_data,
        exception_list,
        pivot_table,
        typed_cells,
    })
}
