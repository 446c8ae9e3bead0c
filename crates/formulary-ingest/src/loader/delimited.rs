//! Delimited text exports (CSV and friends) with encoding detection.

use std::borrow::Cow;
use std::path::Path;

use encoding_rs::{Encoding, WINDOWS_1252};
use formulary_model::{CellValue, Row, Sheet, Table};

use super::TableDecoder;
use super::header::normalize_headers;
use crate::error::{IngestError, Result};

const STRATEGY: &str = "delimited";

/// Reads a delimited text file as a single sheet named after the file stem.
///
/// Text is decoded from a BOM when present, then as UTF-8, then as
/// Windows-1252 (the usual encoding of French office exports). The delimiter
/// is the candidate that occurs most often on the header line.
#[derive(Debug, Clone)]
pub struct DelimitedDecoder {
    delimiters: Vec<u8>,
}

impl Default for DelimitedDecoder {
    fn default() -> Self {
        Self {
            delimiters: vec![b';', b',', b'\t'],
        }
    }
}

impl DelimitedDecoder {
    pub fn with_delimiters(delimiters: Vec<u8>) -> Self {
        Self { delimiters }
    }

    fn detect_delimiter(&self, header_line: &str) -> u8 {
        let mut best = self.delimiters.first().copied().unwrap_or(b',');
        let mut best_count = 0usize;
        for &candidate in &self.delimiters {
            let count = header_line.bytes().filter(|b| *b == candidate).count();
            if count > best_count {
                best = candidate;
                best_count = count;
            }
        }
        best
    }
}

impl TableDecoder for DelimitedDecoder {
    fn name(&self) -> &'static str {
        STRATEGY
    }

    fn try_decode(&self, path: &Path) -> Result<Vec<Sheet>> {
        let bytes = std::fs::read(path).map_err(|e| IngestError::file_read(path, e))?;
        let text = decode_text(&bytes)?;
        let header_line = text.lines().next().unwrap_or_default();
        if header_line.trim().is_empty() {
            return Err(IngestError::decode(STRATEGY, "no header line"));
        }
        let delimiter = self.detect_delimiter(header_line);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(text.as_bytes());

        let mut records = reader.records();
        let header = match records.next() {
            Some(record) => record.map_err(|e| IngestError::decode(STRATEGY, e))?,
            None => return Err(IngestError::decode(STRATEGY, "no header line")),
        };

        let mut raw_rows = Vec::new();
        let mut width = header.len();
        for record in records {
            let record = record.map_err(|e| IngestError::decode(STRATEGY, e))?;
            width = width.max(record.len());
            raw_rows.push(record);
        }

        let mut header_cells: Vec<&str> = header.iter().collect();
        header_cells.resize(width, "");
        let mut table = Table::new(normalize_headers(header_cells));
        for record in raw_rows {
            let cells = record
                .iter()
                .map(|value| {
                    if value.is_empty() {
                        CellValue::Missing
                    } else {
                        CellValue::text(value)
                    }
                })
                .collect();
            table.push_row(Row::new(cells));
        }

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Sheet1".to_string());
        Ok(vec![Sheet::new(name, table)])
    }
}

/// Decodes raw bytes into text, rejecting binary content.
fn decode_text(bytes: &[u8]) -> Result<Cow<'_, str>> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        if had_errors {
            return Err(IngestError::decode(
                STRATEGY,
                format!("invalid {} content", encoding.name()),
            ));
        }
        return Ok(text);
    }
    if bytes.contains(&0) {
        return Err(IngestError::decode(STRATEGY, "binary content"));
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(Cow::Borrowed(text)),
        Err(_) => {
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            Ok(text)
        }
    }
}
