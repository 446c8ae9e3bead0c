//! Serialization shape of the rules document and configuration.

use formulary_model::{
    Condition, PipelineConfig, PriorAgreementPolicy, RenewalDefaults, RulesDocument, RunMode,
    SourceProvenance,
};

fn sample_document() -> RulesDocument {
    RulesDocument {
        country: "TN".to_string(),
        payer: "CNAM".to_string(),
        version: "0.2.0".to_string(),
        generated_at: "2024-05-01T10:00:00Z".to_string(),
        sources: vec![SourceProvenance {
            name: "CNAM PDF".to_string(),
            path: "sources/list.pdf".to_string(),
            sha256: None,
        }],
        disclaimer: "Validation humaine obligatoire.".to_string(),
        default: RenewalDefaults::default(),
        prior_agreement: Some(PriorAgreementPolicy {
            enabled: true,
            match_mode: "by_dci_text_presence".to_string(),
            notes: "best-effort".to_string(),
        }),
        conditions: vec![Condition::chronic_generic()],
        medication_rules: vec![],
    }
}

#[test]
fn rules_document_uses_camel_case_keys_in_order() {
    let json = serde_json::to_string(&sample_document()).expect("serialize rules");
    let keys = [
        "\"country\"",
        "\"payer\"",
        "\"version\"",
        "\"generatedAt\"",
        "\"sources\"",
        "\"disclaimer\"",
        "\"default\"",
        "\"priorAgreement\"",
        "\"conditions\"",
        "\"medicationRules\"",
    ];
    let positions: Vec<usize> = keys
        .iter()
        .map(|key| json.find(key).unwrap_or_else(|| panic!("missing {key}")))
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(json.contains("\"renewalLeadDays\":7"));
    assert!(json.contains("\"maxDispenseDaysIfUnknown\":30"));
    assert!(json.contains("\"sha256\":null"));
    assert!(json.contains("\"appointmentOffsetDays\":23"));
}

#[test]
fn rules_document_omits_absent_prior_agreement() {
    let mut doc = sample_document();
    doc.prior_agreement = None;
    let json = serde_json::to_string(&doc).expect("serialize rules");
    assert!(!json.contains("priorAgreement"));

    let round: RulesDocument = serde_json::from_str(&json).expect("deserialize rules");
    assert_eq!(round, doc);
}

#[test]
fn partial_config_file_keeps_defaults() {
    let config: PipelineConfig = serde_json::from_str(
        r#"{ "recordCap": 12, "sources": { "spreadsheet": "in/list.xlsx" } }"#,
    )
    .expect("parse config");

    assert_eq!(config.record_cap_for(RunMode::Extract), 12);
    assert_eq!(config.sources.spreadsheet.to_str(), Some("in/list.xlsx"));
    assert_eq!(
        config.sources.prior_agreement_document,
        PipelineConfig::default().sources.prior_agreement_document
    );
    assert_eq!(config.pages_to_scan, 8);
    assert_eq!(config.prior_agreement_cap, 50);
    assert!(config.column_aliases.iter().any(|alias| alias == "DCI"));
}
