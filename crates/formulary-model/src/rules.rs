//! Versioned reimbursement rules document.
//!
//! The document is regenerated from scratch on every run and read by the
//! prescription-assistance application. Field names are serialized in
//! camelCase and in declaration order.

use serde::{Deserialize, Serialize};

/// Tag attached to medication rules detected in the prior-agreement list.
pub const PRIOR_AGREEMENT_TAG: &str = "priorAgreement";

/// Match mode advertised when prior-agreement tagging is enabled.
pub const MATCH_BY_DCI_TEXT_PRESENCE: &str = "by_dci_text_presence";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesDocument {
    pub country: String,
    pub payer: String,
    pub version: String,
    /// UTC timestamp, second precision, `Z` suffix.
    pub generated_at: String,
    pub sources: Vec<SourceProvenance>,
    pub disclaimer: String,
    pub default: RenewalDefaults,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_agreement: Option<PriorAgreementPolicy>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub medication_rules: Vec<MedicationRule>,
}

impl RulesDocument {
    /// Rules tagged `priorAgreement` whose `dciContains` text occurs in `dci`.
    ///
    /// Matching ignores case; it is the consumer side of
    /// [`MATCH_BY_DCI_TEXT_PRESENCE`].
    pub fn prior_agreement_rules<'a>(&'a self, dci: &str) -> Vec<&'a MedicationRule> {
        let haystack = dci.to_lowercase();
        self.medication_rules
            .iter()
            .filter(|rule| rule.tags.iter().any(|tag| tag == PRIOR_AGREEMENT_TAG))
            .filter(|rule| {
                rule.dci_contains
                    .as_deref()
                    .is_some_and(|fragment| {
                        !fragment.is_empty()
                            && haystack.contains(&fragment.to_lowercase())
                    })
            })
            .collect()
    }

    pub fn requires_prior_agreement(&self, dci: &str) -> bool {
        !self.prior_agreement_rules(dci).is_empty()
    }
}

/// Where an input came from, with a checksum of its current content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceProvenance {
    pub name: String,
    pub path: String,
    /// `None` when the file was absent at build time.
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalDefaults {
    pub renewal_lead_days: u32,
    pub max_dispense_days_if_unknown: u32,
}

impl Default for RenewalDefaults {
    fn default() -> Self {
        Self {
            renewal_lead_days: 7,
            max_dispense_days_if_unknown: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorAgreementPolicy {
    pub enabled: bool,
    pub match_mode: String,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispense_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_offset_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub code: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewal: Option<RenewalSpec>,
}

impl Condition {
    /// The generic chronic-disease entry shipped in every document.
    pub fn chronic_generic() -> Self {
        Self {
            code: "CHRONIC_GENERIC".to_string(),
            label: "Maladie chronique (générique)".to_string(),
            renewal: Some(RenewalSpec {
                dispense_days: Some(30),
                appointment_offset_days: Some(23),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dci_contains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atc_prefix: Option<String>,
    pub label: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewal: Option<RenewalSpec>,
}
