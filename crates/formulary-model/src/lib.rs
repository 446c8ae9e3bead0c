//! Data model for the reimbursable-medication formulary.
//!
//! The types here are shared by the ingestion, output and CLI crates:
//!
//! - [`Table`], [`Row`] and [`CellValue`]: decoded spreadsheet content
//! - [`MedicationRecord`]: one normalized registry entry
//! - [`RulesDocument`]: the versioned reimbursement rules artifact
//! - [`PipelineConfig`]: paths, caps and heuristics settings for a run
//! - [`renewal`]: renewal scheduling driven by a rules document

pub mod config;
pub mod record;
pub mod renewal;
pub mod rules;
pub mod table;

pub use config::{OutputPaths, PipelineConfig, RunMode, SourcePaths};
pub use record::MedicationRecord;
pub use renewal::{RenewalDates, RenewalDecision, RenewalReason, RenewalRequest};
pub use rules::{
    Condition, MedicationRule, PriorAgreementPolicy, RenewalDefaults, RenewalSpec,
    RulesDocument, SourceProvenance,
};
pub use table::{CellValue, Row, Sheet, Table};
