//! Seed script generation over whole registries.

use formulary_model::{MedicationRecord, RunMode};
use formulary_output::{SeedOptions, render_seed_script};

fn registry(count: usize) -> Vec<MedicationRecord> {
    (0..count)
        .map(|i| MedicationRecord::reimbursable("TN", "CNAM", format!("DCI {i:05}")))
        .collect()
}

#[test]
fn test_cap_keeps_first_records() {
    let records = registry(8001);
    let script = render_seed_script(&records, 8000, &SeedOptions::for_mode(RunMode::Rebuild));

    assert_eq!(script.record_count, 8000);
    let sql = script.to_sql();
    assert_eq!(sql.matches("insert into public.cnam_medications").count(), 8000);
    assert!(sql.contains("'DCI 07999'"));
    assert!(!sql.contains("'DCI 08000'"));
}

#[test]
fn test_rendering_is_deterministic() {
    let records = registry(25);
    let options = SeedOptions::default();
    let first = render_seed_script(&records, 5000, &options).to_sql();
    let second = render_seed_script(&records, 5000, &options).to_sql();
    assert_eq!(first, second);
}

#[test]
fn test_script_layout() {
    let script = render_seed_script(&registry(2), 5000, &SeedOptions::for_mode(RunMode::Rebuild));
    let sql = script.to_sql();

    assert!(sql.starts_with("-- DONIA seed: cnam_medications (best-effort from CNAM XLS)\nbegin;\n"));
    assert!(sql.ends_with("updated_at=now();\ncommit;"));
    let begin = sql.find("begin;").unwrap();
    let extension = sql.find("create extension if not exists pgcrypto;").unwrap();
    let table = sql.find("create table if not exists public.cnam_medications").unwrap();
    let index = sql.find("create unique index if not exists cnam_meds_uniq").unwrap();
    let insert = sql.find("insert into").unwrap();
    assert!(begin < extension && extension < table && table < index && index < insert);
}
