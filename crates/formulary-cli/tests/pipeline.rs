//! Integration tests for the pipeline module.

use std::fs;
use std::path::Path;

use formulary_cli::pipeline::{PipelineRun, load_config, run_pipeline};
use formulary_ingest::IngestError;
use formulary_model::{PipelineConfig, RulesDocument, RunMode};
use tempfile::TempDir;

fn config_in(dir: &Path, spreadsheet: &str) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.sources.spreadsheet = dir.join("sources").join("cnam_vei_regime_base.xls");
    config.sources.prior_agreement_document = dir.join("sources").join("cnam_list_APclmed.pdf");
    config.outputs.rules = dir.join("rules").join("tn_cnam_rules.json");
    config.outputs.seed = dir.join("seeds").join("cnam_medications_seed.sql");
    fs::create_dir_all(dir.join("sources")).unwrap();
    fs::write(&config.sources.spreadsheet, spreadsheet).unwrap();
    config
}

fn read_rules(config: &PipelineConfig) -> RulesDocument {
    let content = fs::read_to_string(&config.outputs.rules).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[test]
fn test_extract_end_to_end() {
    let dir = TempDir::new().unwrap();
    let config = config_in(
        dir.path(),
        "Code;DCI;Forme\n1;AMOXICILLINE;GELULE\n2;nan;CP\n3;amoxicilline;SIROP\n4;L'ASPARAGINASE;INJ\n",
    );

    let result = run_pipeline(&PipelineRun::new(RunMode::Extract, config.clone())).unwrap();
    assert_eq!(result.strategy, "delimited");
    assert_eq!(result.registry_size, 2);
    assert_eq!(result.seeded, 2);
    assert_eq!(result.prior_agreement_candidates, Some(0));
    assert_eq!(result.sheets[0].column, "DCI (alias)");
    assert_eq!(result.sheets[0].rejected, 1);
    assert!(result.written);

    let rules = read_rules(&config);
    assert_eq!(rules.version, "0.2.0");
    assert_eq!(rules.sources.len(), 2);
    assert_eq!(rules.sources[0].sha256, None);
    assert!(rules.sources[1].sha256.as_ref().is_some_and(|sha| sha.len() == 64));
    assert!(rules.prior_agreement.is_some());
    assert!(rules.medication_rules.is_empty());

    let seed = fs::read_to_string(&config.outputs.seed).unwrap();
    assert_eq!(seed.matches("insert into").count(), 2);
    assert!(seed.contains("'L''ASPARAGINASE'"));
    assert!(seed.ends_with("commit;"));
}

#[test]
fn test_rebuild_end_to_end() {
    let dir = TempDir::new().unwrap();
    let config = config_in(
        dir.path(),
        "N,Produit\n,LISTE DES SPECIALITES REMBOURSABLES\n2,IBUPROFENE\n,AB\n,Ibuprofene\n",
    );

    let result = run_pipeline(&PipelineRun::new(RunMode::Rebuild, config.clone())).unwrap();
    assert_eq!(result.sheets[0].column, "Produit (4 values)");
    assert_eq!(result.registry_size, 1);
    assert_eq!(result.prior_agreement_candidates, None);

    let rules = read_rules(&config);
    assert_eq!(rules.version, "0.2.1");
    assert_eq!(rules.sources.len(), 1);
    assert!(rules.prior_agreement.is_none());
    let raw = fs::read_to_string(&config.outputs.rules).unwrap();
    assert!(!raw.contains("priorAgreement"));
}

#[test]
fn test_html_source_leaves_outputs_untouched() {
    let dir = TempDir::new().unwrap();
    let config = config_in(
        dir.path(),
        "<!DOCTYPE html><html><body>Session expirée</body></html>",
    );
    fs::create_dir_all(config.outputs.rules.parent().unwrap()).unwrap();
    fs::create_dir_all(config.outputs.seed.parent().unwrap()).unwrap();
    fs::write(&config.outputs.rules, "previous rules").unwrap();
    fs::write(&config.outputs.seed, "previous seed").unwrap();

    let error = run_pipeline(&PipelineRun::new(RunMode::Rebuild, config.clone())).unwrap_err();
    assert!(matches!(
        error.downcast_ref::<IngestError>(),
        Some(IngestError::SourceIsNotTabular { .. })
    ));
    assert_eq!(fs::read_to_string(&config.outputs.rules).unwrap(), "previous rules");
    assert_eq!(fs::read_to_string(&config.outputs.seed).unwrap(), "previous seed");
}

#[test]
fn test_missing_spreadsheet_is_fatal() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(dir.path(), "DCI\nX\n");
    config.sources.spreadsheet = dir.path().join("nowhere.xls");

    let error = run_pipeline(&PipelineRun::new(RunMode::Extract, config.clone())).unwrap_err();
    assert!(matches!(
        error.downcast_ref::<IngestError>(),
        Some(IngestError::SourceMissing { .. })
    ));
    assert!(!config.outputs.rules.exists());
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path(), "DCI\nPARACETAMOL\n");
    let run = PipelineRun {
        dry_run: true,
        ..PipelineRun::new(RunMode::Extract, config.clone())
    };

    let result = run_pipeline(&run).unwrap();
    assert_eq!(result.registry_size, 1);
    assert!(!result.written);
    assert!(!config.outputs.rules.exists());
    assert!(!config.outputs.seed.exists());
}

#[test]
fn test_record_cap_from_config() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(dir.path(), "DCI\nA1\nA2\nA3\n");
    config.record_cap = Some(2);

    let result = run_pipeline(&PipelineRun::new(RunMode::Extract, config.clone())).unwrap();
    assert_eq!(result.registry_size, 3);
    assert_eq!(result.seeded, 2);
    let seed = fs::read_to_string(&config.outputs.seed).unwrap();
    assert!(seed.contains("'A2'"));
    assert!(!seed.contains("'A3'"));
}

#[test]
fn test_config_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("formulary.json");
    fs::write(&path, r#"{"recordCap": 12, "columnAliases": ["Nom"]}"#).unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.record_cap, Some(12));
    assert_eq!(config.column_aliases, vec!["Nom"]);
    assert_eq!(config.pages_to_scan, 8);
}

#[test]
fn test_failed_seed_write_keeps_previous_rules() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path(), "DCI\nPARACETAMOL\n");
    fs::create_dir_all(config.outputs.rules.parent().unwrap()).unwrap();
    fs::write(&config.outputs.rules, "previous rules").unwrap();
    fs::write(config.outputs.seed.parent().unwrap(), "not a directory").unwrap();

    let result = run_pipeline(&PipelineRun::new(RunMode::Extract, config.clone()));
    assert!(result.is_err());
    assert_eq!(fs::read_to_string(&config.outputs.rules).unwrap(), "previous rules");
}
