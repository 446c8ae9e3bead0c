//! Spreadsheet loading through an ordered list of decoding strategies.
//!
//! Source spreadsheets are published with misleading extensions (an `.xls`
//! that is really OOXML, or a CSV export) and are sometimes replaced by the
//! HTML error page of a failed download. [`TableLoader`] first rejects
//! missing files and markup, then tries each [`TableDecoder`] in order and
//! keeps the first success.

mod delimited;
mod excel;
mod header;
mod sniff;

use std::path::Path;

use formulary_model::Sheet;
use tracing::{debug, info, warn};

use crate::error::{DecodeAttempt, IngestError, Result};

pub use delimited::DelimitedDecoder;
pub use excel::{XlsDecoder, XlsxDecoder};
pub use header::normalize_headers;
pub use sniff::{SNIFF_BYTES, looks_like_markup, sniff_markup};

/// A decoding strategy for tabular files.
pub trait TableDecoder {
    /// Short strategy name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Decodes every sheet of the file, in workbook order.
    fn try_decode(&self, path: &Path) -> Result<Vec<Sheet>>;
}

/// Sheets decoded from one file, with the strategy that succeeded.
#[derive(Debug, Clone)]
pub struct Workbook {
    pub strategy: &'static str,
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// The first sheet, regardless of content.
    pub fn first_sheet(&self) -> Option<&Sheet> {
        self.sheets.first()
    }

    /// Sheets with at least one data row.
    pub fn non_empty_sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter().filter(|sheet| !sheet.table.is_empty())
    }
}

pub struct TableLoader {
    strategies: Vec<Box<dyn TableDecoder>>,
}

impl Default for TableLoader {
    /// Legacy BIFF first, then OOXML, then delimited text.
    fn default() -> Self {
        Self::new(vec![
            Box::new(XlsDecoder),
            Box::new(XlsxDecoder),
            Box::new(DelimitedDecoder::default()),
        ])
    }
}

impl TableLoader {
    pub fn new(strategies: Vec<Box<dyn TableDecoder>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Loads `path` with the first strategy that succeeds.
    ///
    /// # Errors
    ///
    /// - [`IngestError::SourceMissing`] if the file does not exist
    /// - [`IngestError::SourceIsNotTabular`] if the file starts with HTML markup
    /// - [`IngestError::SourceUnreadable`] if every strategy failed
    pub fn load(&self, path: &Path) -> Result<Workbook> {
        if !path.is_file() {
            return Err(IngestError::SourceMissing {
                path: path.to_path_buf(),
            });
        }
        if sniff_markup(path)? {
            return Err(IngestError::SourceIsNotTabular {
                path: path.to_path_buf(),
            });
        }

        let mut attempts = Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            debug!(strategy = strategy.name(), path = %path.display(), "trying decoder");
            match strategy.try_decode(path) {
                Ok(sheets) => {
                    info!(
                        strategy = strategy.name(),
                        sheets = sheets.len(),
                        path = %path.display(),
                        "spreadsheet decoded"
                    );
                    return Ok(Workbook {
                        strategy: strategy.name(),
                        sheets,
                    });
                }
                Err(error) => {
                    warn!(strategy = strategy.name(), %error, "decoder failed");
                    attempts.push(DecodeAttempt {
                        strategy: strategy.name().to_string(),
                        error: error.to_string(),
                    });
                }
            }
        }

        Err(IngestError::SourceUnreadable {
            path: path.to_path_buf(),
            attempts,
        })
    }
}
