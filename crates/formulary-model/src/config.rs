//! Run configuration.
//!
//! Every setting has a default so a configuration file only needs to list
//! what it overrides. CLI flags are applied on top by the binary.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Header names that identify the substance-name column, in priority order.
pub const DEFAULT_COLUMN_ALIASES: &[&str] = &[
    "DCI",
    "Dci",
    "dci",
    "Denomination",
    "Dénomination",
    "DESIGNATION",
    "Designation",
    "Libelle",
    "LIBELLE",
    "Libellé",
];

/// Title phrases of the prior-agreement document that look like names.
pub const DEFAULT_BOILERPLATE: &[&str] = &["LISTE EXAUSTIVE", "CAISSE NATIONALE"];

/// Which driver is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Full run: spreadsheet plus prior-agreement document.
    #[default]
    Extract,
    /// Spreadsheet-only rebuild of the registry.
    Rebuild,
}

impl RunMode {
    #[must_use]
    pub const fn default_record_cap(self) -> usize {
        match self {
            Self::Extract => 5000,
            Self::Rebuild => 8000,
        }
    }

    #[must_use]
    pub const fn rules_version(self) -> &'static str {
        match self {
            Self::Extract => "0.2.0",
            Self::Rebuild => "0.2.1",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Extract => "extract",
            Self::Rebuild => "rebuild",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourcePaths {
    pub spreadsheet: PathBuf,
    pub prior_agreement_document: PathBuf,
}

impl Default for SourcePaths {
    fn default() -> Self {
        Self {
            spreadsheet: PathBuf::from("sources/cnam_vei_regime_base.xls"),
            prior_agreement_document: PathBuf::from("sources/cnam_list_APclmed.pdf"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputPaths {
    pub rules: PathBuf,
    pub seed: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            rules: PathBuf::from("rules/tn_cnam_rules.json"),
            seed: PathBuf::from("seeds/cnam_medications_seed.sql"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    pub sources: SourcePaths,
    pub outputs: OutputPaths,
    /// Maximum upserts in the seed script; `None` uses the run mode default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_cap: Option<usize>,
    /// Leading pages of the prior-agreement document to scan.
    pub pages_to_scan: usize,
    pub column_aliases: Vec<String>,
    /// Maximum prior-agreement candidates turned into medication rules.
    pub prior_agreement_cap: usize,
    pub boilerplate: Vec<String>,
    pub country_code: String,
    pub payer: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sources: SourcePaths::default(),
            outputs: OutputPaths::default(),
            record_cap: None,
            pages_to_scan: 8,
            column_aliases: DEFAULT_COLUMN_ALIASES
                .iter()
                .map(|alias| (*alias).to_string())
                .collect(),
            prior_agreement_cap: 50,
            boilerplate: DEFAULT_BOILERPLATE
                .iter()
                .map(|phrase| (*phrase).to_string())
                .collect(),
            country_code: "TN".to_string(),
            payer: "CNAM".to_string(),
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub fn record_cap_for(&self, mode: RunMode) -> usize {
        self.record_cap.unwrap_or_else(|| mode.default_record_cap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_cap_defaults_per_mode() {
        let config = PipelineConfig::default();
        assert_eq!(config.record_cap_for(RunMode::Extract), 5000);
        assert_eq!(config.record_cap_for(RunMode::Rebuild), 8000);

        let config = PipelineConfig {
            record_cap: Some(10),
            ..PipelineConfig::default()
        };
        assert_eq!(config.record_cap_for(RunMode::Rebuild), 10);
    }
}
