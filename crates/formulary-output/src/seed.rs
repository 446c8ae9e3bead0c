//! PostgreSQL seed script for the medication registry.
//!
//! The script is idempotent: it creates the table and its unique index if
//! needed and upserts every record on `(country_code, payer, dci)`.

use formulary_model::{MedicationRecord, RunMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedOptions {
    /// Schema-qualified table name.
    pub table: String,
    pub index: String,
    /// First line of the script, without the `-- ` prefix.
    pub header: String,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self::for_mode(RunMode::Extract)
    }
}

impl SeedOptions {
    pub fn for_mode(mode: RunMode) -> Self {
        let origin = match mode {
            RunMode::Extract => "CNAM sources",
            RunMode::Rebuild => "CNAM XLS",
        };
        Self {
            table: "public.cnam_medications".to_string(),
            index: "cnam_meds_uniq".to_string(),
            header: format!("DONIA seed: cnam_medications (best-effort from {origin})"),
        }
    }
}

/// Rendered statements, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedScript {
    pub statements: Vec<String>,
    /// Number of upsert statements.
    pub record_count: usize,
}

impl SeedScript {
    pub fn to_sql(&self) -> String {
        self.statements.join("\n")
    }
}

/// SQL string literal with doubled single quotes; `None` is `NULL`.
pub fn sql_literal(value: Option<&str>) -> String {
    match value {
        Some(value) => format!("'{}'", value.replace('\'', "''")),
        None => "NULL".to_string(),
    }
}

fn create_table_statement(table: &str) -> String {
    format!(
        "create table if not exists {table} (
  id uuid primary key default gen_random_uuid(),
  country_code text not null default 'TN',
  payer text not null default 'CNAM',
  code text,
  atc text,
  dci text not null,
  brand text,
  form text,
  strength text,
  reimbursable boolean default true,
  updated_at timestamptz not null default now()
);"
    )
}

pub fn upsert_statement(record: &MedicationRecord, table: &str) -> String {
    format!(
        "insert into {table}(country_code,payer,code,atc,dci,brand,form,strength,reimbursable,updated_at)
values(
  {country_code},
  {payer},
  {code},
  {atc},
  {dci},
  {brand},
  {form},
  {strength},
  {reimbursable},
  now()
)
on conflict (country_code,payer,dci)
do update set
  code=excluded.code,
  atc=excluded.atc,
  brand=excluded.brand,
  form=excluded.form,
  strength=excluded.strength,
  reimbursable=excluded.reimbursable,
  updated_at=now();",
        country_code = sql_literal(Some(&record.country_code)),
        payer = sql_literal(Some(&record.payer)),
        code = sql_literal(record.code.as_deref()),
        atc = sql_literal(record.atc.as_deref()),
        dci = sql_literal(Some(&record.dci)),
        brand = sql_literal(record.brand.as_deref()),
        form = sql_literal(record.form.as_deref()),
        strength = sql_literal(record.strength.as_deref()),
        reimbursable = record.reimbursable,
    )
}

/// Renders the script for the first `cap` records.
pub fn render_seed_script(
    records: &[MedicationRecord],
    cap: usize,
    options: &SeedOptions,
) -> SeedScript {
    let seeded = &records[..records.len().min(cap)];
    if seeded.len() < records.len() {
        tracing::warn!(
            records = records.len(),
            cap,
            "record cap reached, remaining records not seeded"
        );
    }

    let mut statements = Vec::with_capacity(seeded.len() + 6);
    statements.push(format!("-- {}", options.header));
    statements.push("begin;".to_string());
    statements.push("create extension if not exists pgcrypto;".to_string());
    statements.push(create_table_statement(&options.table));
    statements.push(format!(
        "create unique index if not exists {} on {}(country_code,payer,dci);",
        options.index, options.table
    ));
    statements.extend(
        seeded
            .iter()
            .map(|record| upsert_statement(record, &options.table)),
    );
    statements.push("commit;".to_string());

    SeedScript {
        statements,
        record_count: seeded.len(),
    }
}
