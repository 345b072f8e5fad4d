//! Conversion of raw sheet cells into a typed `DataFrame`.

use std::collections::BTreeMap;

use calamine::Data;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use cohort_common::format_numeric;
use polars::prelude::{Column, DataFrame, DataType, TimeUnit};

use crate::error::Result;

const EMPTY: &Data = &Data::Empty;

/// Collapse internal whitespace and trim a header cell.
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Calendar value of a date cell. Durations are not dates.
fn cell_datetime(cell: &Data) -> Option<NaiveDateTime> {
    match cell {
        Data::DateTime(dt) if dt.is_datetime() => dt.as_datetime(),
        Data::DateTimeIso(s) => s.parse::<NaiveDateTime>().ok().or_else(|| {
            s.parse::<NaiveDate>()
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        }),
        _ => None,
    }
}

fn datetime_text(value: NaiveDateTime) -> String {
    if value.time() == NaiveTime::MIN {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(v) => Some(v.to_string()),
        Data::Float(v) => Some(format_numeric(*v)),
        Data::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        other => Some(cell_datetime(other).map_or_else(|| other.to_string(), datetime_text)),
    }
}

/// Unique header names: blanks become `Unnamed: <idx>`, repeats get `.1`, `.2`.
fn build_headers(row: &[Data], width: usize) -> Vec<String> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    let mut headers = Vec::with_capacity(width);
    for idx in 0..width {
        let raw = row.get(idx).and_then(cell_text).unwrap_or_default();
        let mut name = normalize_header(&raw);
        if name.is_empty() {
            name = format!("Unnamed: {idx}");
        }
        let count = seen.entry(name.clone()).or_insert(0);
        if *count > 0 {
            name = format!("{name}.{count}");
        }
        *count += 1;
        headers.push(name);
    }
    headers
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Empty,
    Int,
    Float,
    Bool,
    Datetime,
    Text,
}

impl ColumnKind {
    fn of(cell: &Data) -> Self {
        match cell {
            Data::Empty => ColumnKind::Empty,
            Data::String(s) if s.trim().is_empty() => ColumnKind::Empty,
            Data::Int(_) => ColumnKind::Int,
            Data::Float(v) if v.is_finite() && v.fract() == 0.0 => ColumnKind::Int,
            Data::Float(_) => ColumnKind::Float,
            Data::Bool(_) => ColumnKind::Bool,
            Data::DateTime(_) | Data::DateTimeIso(_) if cell_datetime(cell).is_some() => {
                ColumnKind::Datetime
            }
            _ => ColumnKind::Text,
        }
    }

    fn merge(self, other: Self) -> Self {
        use ColumnKind::{Bool, Datetime, Empty, Float, Int, Text};
        match (self, other) {
            (Empty, kind) | (kind, Empty) => kind,
            (Int, Int) => Int,
            (Int | Float, Int | Float) => Float,
            (Bool, Bool) => Bool,
            (Datetime, Datetime) => Datetime,
            _ => Text,
        }
    }

    fn infer(cells: &[&Data]) -> Self {
        cells
            .iter()
            .fold(ColumnKind::Empty, |kind, cell| kind.merge(ColumnKind::of(cell)))
    }
}

fn build_column(name: &str, cells: &[&Data], kind: ColumnKind) -> Result<Column> {
    let column = match kind {
        ColumnKind::Int => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|cell| match cell {
                    Data::Int(v) => Some(*v),
                    Data::Float(v) => Some(*v as i64),
                    _ => None,
                })
                .collect();
            Column::new(name.into(), values)
        }
        ColumnKind::Float => {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|cell| match cell {
                    Data::Int(v) => Some(*v as f64),
                    Data::Float(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Column::new(name.into(), values)
        }
        ColumnKind::Bool => {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|cell| match cell {
                    Data::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            Column::new(name.into(), values)
        }
        ColumnKind::Datetime => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|cell| cell_datetime(cell).map(|dt| dt.and_utc().timestamp_millis()))
                .collect();
            Column::new(name.into(), values)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        }
        ColumnKind::Empty | ColumnKind::Text => {
            let values: Vec<Option<String>> = cells.iter().map(|cell| cell_text(cell)).collect();
            Column::new(name.into(), values)
        }
    };
    Ok(column)
}

/// Typed values of a column that mixes text with one other kind of cell.
///
/// Text cells are null in the result. Returns `None` when the column is not
/// mixed or mixes more than two kinds.
fn typed_column(name: &str, cells: &[&Data], kind: ColumnKind) -> Result<Option<Column>> {
    if kind != ColumnKind::Text {
        return Ok(None);
    }
    let typed: Vec<&Data> = cells
        .iter()
        .map(|cell| {
            if ColumnKind::of(cell) == ColumnKind::Text {
                EMPTY
            } else {
                *cell
            }
        })
        .collect();
    match ColumnKind::infer(&typed) {
        ColumnKind::Empty | ColumnKind::Text => Ok(None),
        kind => build_column(name, &typed, kind).map(Some),
    }
}

/// One sheet as a frame plus the typed cells of its mixed columns.
#[derive(Debug, Clone)]
pub struct SheetTable {
    /// Every column, with mixed columns as text.
    pub frame: DataFrame,
    /// Row-aligned with `frame`. Holds one column per mixed column of
    /// `frame`, with the numeric, boolean or date cells in place and nulls
    /// where the cell was text.
    pub typed_cells: DataFrame,
}

/// Build a [`SheetTable`] from the rows of a sheet.
///
/// The first non-blank row supplies the headers. Every later row that is not
/// entirely blank becomes one record; short rows are padded with nulls.
/// Integer-valued numeric columns become `Int64`, other numeric columns
/// `Float64`, date columns `Datetime`, and anything mixed falls back to text
/// with its typed cells kept in [`SheetTable::typed_cells`].
///
/// # Errors
///
/// Returns an error if Polars rejects the assembled columns.
pub fn table_from_rows(rows: &[Vec<Data>]) -> Result<SheetTable> {
    let mut records = rows.iter().filter(|row| !row.iter().all(is_blank));
    let Some(header_row) = records.next() else {
        return Ok(SheetTable {
            frame: DataFrame::empty(),
            typed_cells: DataFrame::empty(),
        });
    };
    let body: Vec<&Vec<Data>> = records.collect();
    let width = body
        .iter()
        .map(|row| row.len())
        .chain(std::iter::once(header_row.len()))
        .max()
        .unwrap_or(0);
    let headers = build_headers(header_row, width);

    let mut columns = Vec::with_capacity(width);
    let mut typed_columns = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        let cells: Vec<&Data> = body
            .iter()
            .map(|row| row.get(idx).unwrap_or(EMPTY))
            .collect();
        let kind = ColumnKind::infer(&cells);
        columns.push(build_column(header, &cells, kind)?);
        if let Some(typed) = typed_column(header, &cells, kind)? {
            typed_columns.push(typed);
        }
    }
    Ok(SheetTable {
        frame: DataFrame::new(columns)?,
        typed_cells: DataFrame::new(typed_columns)?,
    })
}

/// Build a `DataFrame` from the rows of a sheet, as [`table_from_rows`]
/// without the typed cells.
///
/// # Errors
///
/// Returns an error if Polars rejects the assembled columns.
pub fn frame_from_rows(rows: &[Vec<Data>]) -> Result<DataFrame> {
    table_from_rows(rows).map(|table| table.frame)
}
