//! Loading, column selection and normalization over real files.

use std::io::Write;

use formulary_ingest::{
    ColumnChoice, IngestError, NormalizeOptions, SelectionPolicy, TableLoader, build_registry,
    normalize_candidate, raw_candidates, select_name_column,
};
use formulary_model::config::DEFAULT_COLUMN_ALIASES;
use tempfile::NamedTempFile;

fn csv_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".xls").unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn registry_names(content: &str, policy: SelectionPolicy, options: NormalizeOptions) -> Vec<String> {
    let file = csv_file(content);
    let workbook = TableLoader::default().load(file.path()).unwrap();
    let table = &workbook.first_sheet().unwrap().table;
    let choice = select_name_column(table, DEFAULT_COLUMN_ALIASES, policy);
    let names = raw_candidates(table, &choice)
        .into_iter()
        .filter_map(|raw| normalize_candidate(raw, &options).ok());
    build_registry(names, "TN", "CNAM")
        .into_iter()
        .map(|record| record.dci)
        .collect()
}

#[test]
fn test_mislabelled_csv_is_decoded_by_fallback() {
    let file = csv_file("ID;DCI\n1;AMOXICILLINE\n");
    let workbook = TableLoader::default().load(file.path()).unwrap();
    assert_eq!(workbook.strategy, "delimited");
    assert_eq!(workbook.sheets.len(), 1);
}

#[test]
fn test_designation_column_scenario() {
    let names = registry_names(
        "Code;Designation;Prix\n\
         1001;Paracetamol 500mg;1.2\n\
         1002;nan;2.0\n\
         1003;  PARACETAMOL 500MG ;1.2\n\
         1004;Ibuprofene 400mg;3.1\n",
        SelectionPolicy::AliasOrRowFallback,
        NormalizeOptions::extract(),
    );
    assert_eq!(names, vec!["Paracetamol 500mg", "Ibuprofene 400mg"]);
}

#[test]
fn test_alias_column_beats_numeric_columns() {
    let file = csv_file("ID;CODE;PRIX;DCI\n1;10;2.5;AMOXICILLINE\n2;11;3.5;\n3;12;4.5;\n");
    let workbook = TableLoader::default().load(file.path()).unwrap();
    let table = &workbook.first_sheet().unwrap().table;
    let choice = select_name_column(table, DEFAULT_COLUMN_ALIASES, SelectionPolicy::AliasOrRanked);
    assert!(matches!(choice, ColumnChoice::Alias { index: 3, .. }));
}

#[test]
fn test_rebuild_uses_most_populated_column() {
    let names = registry_names(
        "N;Produit;Note\n\
         ;LISTE DES MEDICAMENTS REMBOURSABLES;\n\
         1;AMOXICILLINE;x\n\
         2;IBUPROFENE;\n\
         ;AB;\n",
        SelectionPolicy::AliasOrRanked,
        NormalizeOptions::rebuild(),
    );
    assert_eq!(names, vec!["AMOXICILLINE", "IBUPROFENE"]);
}

#[test]
fn test_html_download_is_not_tabular() {
    let file = csv_file("<!DOCTYPE html>\n<html><head><title>Erreur</title></head></html>");
    let result = TableLoader::default().load(file.path());
    assert!(matches!(result, Err(IngestError::SourceIsNotTabular { .. })));
}
