//! Rules document assembly.

use chrono::{DateTime, Utc};
use formulary_model::rules::{MATCH_BY_DCI_TEXT_PRESENCE, PRIOR_AGREEMENT_TAG};
use formulary_model::{
    Condition, MedicationRule, PriorAgreementPolicy, RenewalDefaults, RulesDocument, RunMode,
    SourceProvenance,
};

use crate::error::Result;

/// Longest `dciContains` fragment, in characters.
const RULE_FRAGMENT_CHARS: usize = 60;
/// Longest name shown in a rule label, in characters.
const RULE_LABEL_CHARS: usize = 40;

const PRIOR_AGREEMENT_LABEL: &str = "Accord préalable (détecté)";

pub const PRIOR_AGREEMENT_NOTES: &str = "DONIA marque 'prior agreement' si DCI détectée dans le PDF \
     CNAM accord préalable (extraction best-effort).";

pub const PRIOR_AGREEMENT_SOURCE_NAME: &str =
    "CNAM PDF - spécialités soumises à l'accord préalable (classées par DCI)";

/// Human-validation notice embedded in the document.
pub const fn disclaimer(mode: RunMode) -> &'static str {
    match mode {
        RunMode::Extract => {
            "Règles CNAM: à valider à partir des circulaires/listes CNAM officielles. DONIA ne \
             produit pas de prescription finale automatiquement. Validation humaine obligatoire."
        }
        RunMode::Rebuild => {
            "Règles CNAM: à valider à partir des textes officiels. DONIA ne génère pas de \
             prescription finale automatiquement. Validation humaine obligatoire."
        }
    }
}

pub const fn spreadsheet_source_name(mode: RunMode) -> &'static str {
    match mode {
        RunMode::Extract => {
            "CNAM XLS - liste des médicaments classés en VEI couverts par le régime de base"
        }
        RunMode::Rebuild => "CNAM XLS (VEI couverts régime de base)",
    }
}

/// Everything a rules document is built from.
#[derive(Debug, Clone)]
pub struct RulesInput<'a> {
    pub mode: RunMode,
    pub generated_at: DateTime<Utc>,
    pub sources: Vec<SourceProvenance>,
    /// Prior-agreement candidates in first-seen order.
    pub candidates: &'a [String],
    pub prior_agreement_cap: usize,
    pub country_code: &'a str,
    pub payer: &'a str,
}

/// `2024-05-01T08:30:00Z`: UTC, whole seconds.
pub fn format_generated_at(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn truncate(value: &str, max: usize) -> &str {
    match value.char_indices().nth(max) {
        Some((end, _)) => &value[..end],
        None => value,
    }
}

/// Tag rule for one detected prior-agreement name.
pub fn prior_agreement_rule(candidate: &str) -> MedicationRule {
    MedicationRule {
        dci_contains: Some(truncate(candidate, RULE_FRAGMENT_CHARS).to_string()),
        atc_prefix: None,
        label: format!(
            "{PRIOR_AGREEMENT_LABEL}: {}",
            truncate(candidate, RULE_LABEL_CHARS)
        ),
        tags: vec![PRIOR_AGREEMENT_TAG.to_string()],
        renewal: None,
    }
}

/// Builds a fresh document; nothing from a previous run is consulted.
///
/// Only the extract run advertises prior-agreement tagging.
pub fn build_rules(input: RulesInput<'_>) -> RulesDocument {
    let prior_agreement = (input.mode == RunMode::Extract).then(|| PriorAgreementPolicy {
        enabled: true,
        match_mode: MATCH_BY_DCI_TEXT_PRESENCE.to_string(),
        notes: PRIOR_AGREEMENT_NOTES.to_string(),
    });
    let medication_rules: Vec<MedicationRule> = input
        .candidates
        .iter()
        .take(input.prior_agreement_cap)
        .map(|candidate| prior_agreement_rule(candidate))
        .collect();

    tracing::debug!(
        version = input.mode.rules_version(),
        rules = medication_rules.len(),
        candidates = input.candidates.len(),
        "rules document built"
    );

    RulesDocument {
        country: input.country_code.to_string(),
        payer: input.payer.to_string(),
        version: input.mode.rules_version().to_string(),
        generated_at: format_generated_at(input.generated_at),
        sources: input.sources,
        disclaimer: disclaimer(input.mode).to_string(),
        default: RenewalDefaults::default(),
        prior_agreement,
        conditions: vec![Condition::chronic_generic()],
        medication_rules,
    }
}

/// Pretty-printed JSON with non-ASCII characters kept as is.
pub fn render_rules_json(document: &RulesDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}
