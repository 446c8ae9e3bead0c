use std::path::PathBuf;

use formulary_model::RunMode;

/// Outcome of name extraction for one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSummary {
    pub name: String,
    pub rows: usize,
    /// Chosen name column, or the row fallback.
    pub column: String,
    pub accepted: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone)]
pub struct RunResult {
    pub mode: RunMode,
    pub spreadsheet: PathBuf,
    /// Decoder that read the spreadsheet.
    pub strategy: &'static str,
    pub sheets: Vec<SheetSummary>,
    /// Distinct names after deduplication.
    pub registry_size: usize,
    /// Upserts in the seed script.
    pub seeded: usize,
    pub record_cap: usize,
    /// `None` when the run does not scan the prior-agreement document.
    pub prior_agreement_candidates: Option<usize>,
    pub medication_rules: usize,
    pub rules_version: String,
    pub rules_path: PathBuf,
    pub seed_path: PathBuf,
    /// False for dry runs.
    pub written: bool,
}
