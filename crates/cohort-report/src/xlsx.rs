//! XLSX output generation.

use std::path::Path;

use anyhow::{Context, Result};
use cohort_common::any_to_string;
use polars::prelude::{AnyValue, Column, DataFrame, TimeUnit};
use rust_xlsxwriter::{ColNum, Format, FormatAlign, FormatBorder, RowNum, Workbook, Worksheet};
use tracing::{debug, info};

/// Leading column written before the table's own columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowIndex<'a> {
    /// Row positions `0..height`.
    Positional,
    /// Values of this column; the column is not repeated in the body.
    Column(&'a str),
}

/// Serial date of 1970-01-01 in the 1900 date system.
const UNIX_EPOCH_SERIAL: f64 = 25_569.0;
const MS_PER_DAY: i64 = 86_400_000;

/// One table destined for one sheet.
#[derive(Debug, Clone, Copy)]
pub struct OutputSheet<'a> {
    pub name: &'a str,
    pub frame: &'a DataFrame,
    pub index: RowIndex<'a>,
    /// Row-aligned cells that replace the frame's value wherever they are not null.
    pub typed_cells: Option<&'a DataFrame>,
}

impl<'a> OutputSheet<'a> {
    pub fn new(name: &'a str, frame: &'a DataFrame) -> Self {
        Self {
            name,
            frame,
            index: RowIndex::Positional,
            typed_cells: None,
        }
    }

    #[must_use]
    pub fn with_index_column(mut self, column: &'a str) -> Self {
        self.index = RowIndex::Column(column);
        self
    }

    /// Write the non-null cells of same-named columns of `cells` in place of the frame's.
    #[must_use]
    pub fn with_typed_cells(mut self, cells: &'a DataFrame) -> Self {
        self.typed_cells = Some(cells);
        self
    }
}

struct CellFormats {
    header: Format,
    date: Format,
    datetime: Format,
}

impl CellFormats {
    fn new() -> Self {
        Self {
            header: Format::new()
                .set_bold()
                .set_border(FormatBorder::Thin)
                .set_align(FormatAlign::Center),
            date: Format::new().set_num_format("yyyy-mm-dd"),
            datetime: Format::new().set_num_format("yyyy-mm-dd hh:mm:ss"),
        }
    }
}

fn cell_position(row: usize, col: usize) -> Result<(RowNum, ColNum)> {
    let row = RowNum::try_from(row).with_context(|| format!("row {row} out of range"))?;
    let col = ColNum::try_from(col).with_context(|| format!("column {col} out of range"))?;
    Ok((row, col))
}

/// Milliseconds since the Unix epoch for a date or datetime value.
fn epoch_millis(value: &AnyValue<'_>) -> Option<i64> {
    match value {
        AnyValue::Date(days) => Some(i64::from(*days) * MS_PER_DAY),
        AnyValue::Datetime(v, unit, _) | AnyValue::DatetimeOwned(v, unit, _) => {
            Some(match unit {
                TimeUnit::Milliseconds => *v,
                TimeUnit::Microseconds => v.div_euclid(1_000),
                TimeUnit::Nanoseconds => v.div_euclid(1_000_000),
            })
        }
        _ => None,
    }
}

fn write_value(
    worksheet: &mut Worksheet,
    row: RowNum,
    col: ColNum,
    value: AnyValue<'_>,
    formats: &CellFormats,
    header: bool,
) -> Result<()> {
    if let Some(ms) = epoch_millis(&value) {
        let format = if header {
            &formats.header
        } else if ms.rem_euclid(MS_PER_DAY) == 0 {
            &formats.date
        } else {
            &formats.datetime
        };
        let serial = ms as f64 / MS_PER_DAY as f64 + UNIX_EPOCH_SERIAL;
        worksheet.write_number_with_format(row, col, serial, format)?;
        return Ok(());
    }
    let number = match value {
        AnyValue::Null => return Ok(()),
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::Boolean(b) => {
            worksheet.write_boolean(row, col, b)?;
            return Ok(());
        }
        _ => None,
    };
    match (number, header) {
        (Some(number), true) => {
            worksheet.write_number_with_format(row, col, number, &formats.header)?;
        }
        (Some(number), false) => {
            worksheet.write_number(row, col, number)?;
        }
        (None, true) => {
            worksheet.write_string_with_format(
                row,
                col,
                any_to_string(value),
                &formats.header,
            )?;
        }
        (None, false) => {
            worksheet.write_string(row, col, any_to_string(value))?;
        }
    }
    Ok(())
}

/// The typed cell at `idx` when there is one, otherwise the frame's own value.
fn cell_value<'a>(
    column: &'a Column,
    typed: Option<&'a Column>,
    idx: usize,
) -> Result<AnyValue<'a>> {
    if let Some(typed) = typed {
        let value = typed.get(idx)?;
        if !value.is_null() {
            return Ok(value);
        }
    }
    Ok(column.get(idx)?)
}

fn write_sheet(workbook: &mut Workbook, sheet: &OutputSheet<'_>) -> Result<()> {
    let df = sheet.frame;
    let formats = CellFormats::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sheet.name)
        .with_context(|| format!("name sheet '{}'", sheet.name))?;

    let index_column = match sheet.index {
        RowIndex::Positional => None,
        RowIndex::Column(name) => Some(
            df.column(name)
                .with_context(|| format!("index column '{name}' in sheet '{}'", sheet.name))?,
        ),
    };
    let body: Vec<_> = df
        .get_columns()
        .iter()
        .filter(|column| match sheet.index {
            RowIndex::Column(name) => column.name().as_str() != name,
            RowIndex::Positional => true,
        })
        .collect();
    let typed: Vec<Option<&Column>> = body
        .iter()
        .map(|column| {
            sheet
                .typed_cells
                .and_then(|cells| cells.column(column.name().as_str()).ok())
                .filter(|cells| cells.len() == df.height())
        })
        .collect();

    for (offset, column) in body.iter().enumerate() {
        let (row, col) = cell_position(0, offset + 1)?;
        worksheet.write_string_with_format(row, col, column.name().as_str(), &formats.header)?;
    }

    for idx in 0..df.height() {
        let (row, col) = cell_position(idx + 1, 0)?;
        match index_column {
            Some(column) => write_value(worksheet, row, col, column.get(idx)?, &formats, true)?,
            None => {
                worksheet.write_number_with_format(row, col, idx as f64, &formats.header)?;
            }
        }
        for (offset, (column, typed)) in body.iter().zip(&typed).enumerate() {
            let (row, col) = cell_position(idx + 1, offset + 1)?;
            let value = cell_value(column, *typed, idx)?;
            write_value(worksheet, row, col, value, &formats, false)?;
        }
    }

    debug!(
        sheet = sheet.name,
        rows = df.height(),
        columns = body.len(),
        "sheet written"
    );
    Ok(())
}

/// Assemble the workbook in memory.
///
/// # Errors
///
/// Returns an error for an invalid or duplicate sheet name, a missing index
/// column, or a table that exceeds the xlsx grid.
pub fn build_workbook(sheets: &[OutputSheet<'_>]) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    for sheet in sheets {
        write_sheet(&mut workbook, sheet)?;
    }
    Ok(workbook)
}

/// Assemble the workbook and save it to `path`.
///
/// # Errors
///
/// Returns an error if assembly fails or the file cannot be written.
pub fn write_workbook(path: &Path, sheets: &[OutputSheet<'_>]) -> Result<()> {
    let mut workbook = build_workbook(sheets)?;
    workbook
        .save(path)
        .with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), sheets = sheets.len(), "workbook written");
    Ok(())
}
