//! Workbook decoders backed by calamine.

use std::fmt;
use std::io::{Read, Seek};
use std::path::Path;

use calamine::{Data, Range, Reader, Xls, Xlsx, open_workbook};
use formulary_model::{CellValue, Row, Sheet, Table};

use super::TableDecoder;
use super::header::normalize_headers;
use crate::error::{IngestError, Result};

/// Legacy BIFF (`.xls`) workbooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsDecoder;

/// Office Open XML (`.xlsx`) workbooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxDecoder;

impl TableDecoder for XlsDecoder {
    fn name(&self) -> &'static str {
        "xls"
    }

    fn try_decode(&self, path: &Path) -> Result<Vec<Sheet>> {
        let mut workbook: Xls<_> =
            open_workbook(path).map_err(|e| IngestError::decode(self.name(), e))?;
        read_sheets(&mut workbook, self.name())
    }
}

impl TableDecoder for XlsxDecoder {
    fn name(&self) -> &'static str {
        "xlsx"
    }

    fn try_decode(&self, path: &Path) -> Result<Vec<Sheet>> {
        let mut workbook: Xlsx<_> =
            open_workbook(path).map_err(|e| IngestError::decode(self.name(), e))?;
        read_sheets(&mut workbook, self.name())
    }
}

fn read_sheets<RS, R>(workbook: &mut R, strategy: &'static str) -> Result<Vec<Sheet>>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: fmt::Display,
{
    let names = workbook.sheet_names();
    if names.is_empty() {
        return Err(IngestError::decode(strategy, "workbook has no sheets"));
    }

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| IngestError::decode(strategy, format!("sheet '{name}': {e}")))?;
        let table = table_from_range(&range);
        tracing::debug!(sheet = %name, rows = table.height(), columns = table.columns.len(), "sheet read");
        sheets.push(Sheet::new(name, table));
    }
    Ok(sheets)
}

/// Builds a table from a cell range, using the first row as the header.
fn table_from_range(range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Table::default();
    };

    let columns = normalize_headers(header.iter().map(|cell| match cell_value(cell) {
        CellValue::Text(text) => text,
        CellValue::Missing => String::new(),
    }));
    let mut table = Table::new(columns);
    for cells in rows {
        table.push_row(Row::new(cells.iter().map(cell_value).collect()));
    }
    table
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Missing,
        Data::String(text) => CellValue::Text(text.clone()),
        Data::Float(value) => CellValue::Text(format_float(*value)),
        Data::Int(value) => CellValue::Text(value.to_string()),
        Data::Bool(value) => CellValue::Text(if *value { "True" } else { "False" }.to_string()),
        other => CellValue::Text(other.to_string()),
    }
}

/// Renders whole floats without a fractional part (codes stored as numbers).
fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
