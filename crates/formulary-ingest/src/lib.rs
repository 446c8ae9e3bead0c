//! Reading and normalizing formulary sources.
//!
//! - [`loader`]: spreadsheet decoding with ordered fallback strategies
//! - [`column`]: heuristic choice of the substance-name column
//! - [`normalize`] and [`dedupe`]: candidate cleanup and uniqueness
//! - [`prior_agreement`]: name detection in the prior-agreement document
//! - [`checksum`]: source provenance

pub mod checksum;
pub mod column;
pub mod dedupe;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod prior_agreement;

pub use checksum::{compute_file_sha256, source_provenance};
pub use column::{ColumnChoice, SelectionPolicy, raw_candidates, select_name_column};
pub use dedupe::{Deduplicator, build_registry, dedupe_case_insensitive};
pub use error::{DecodeAttempt, IngestError, Result};
pub use loader::{TableDecoder, TableLoader, Workbook};
pub use normalize::{NormalizeOptions, Rejection, normalize_candidate};
pub use prior_agreement::{PageSource, PdfPages, scan_document, scan_text};
