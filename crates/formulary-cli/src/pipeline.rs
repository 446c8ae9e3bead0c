//! Formulary pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Load**: decode the spreadsheet and keep the sheets the run mode uses
//! 2. **Extract**: pick the name column, normalize and deduplicate names
//! 3. **Scan**: detect prior-agreement names (extract mode only)
//! 4. **Build**: assemble the rules document and the seed script
//! 5. **Output**: replace both artifacts
//!
//! Every artifact is computed before anything is written, so a fatal error
//! leaves existing outputs untouched.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info, info_span};

use formulary_ingest::{
    NormalizeOptions, SelectionPolicy, TableLoader, build_registry, normalize_candidate,
    raw_candidates, scan_document, select_name_column, source_provenance,
};
use formulary_model::{MedicationRecord, PipelineConfig, RulesDocument, RunMode, Sheet};
use formulary_output::rules::{PRIOR_AGREEMENT_SOURCE_NAME, spreadsheet_source_name};
use formulary_output::{
    RulesInput, SeedOptions, SeedScript, build_rules, render_rules_json, render_seed_script,
    write_artifacts,
};

use crate::types::{RunResult, SheetSummary};

/// One invocation of the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub mode: RunMode,
    pub config: PipelineConfig,
    /// Compute everything but write nothing.
    pub dry_run: bool,
    pub generated_at: DateTime<Utc>,
}

impl PipelineRun {
    pub fn new(mode: RunMode, config: PipelineConfig) -> Self {
        Self {
            mode,
            config,
            dry_run: false,
            generated_at: Utc::now(),
        }
    }
}

/// Reads a configuration file; absent fields keep their defaults.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parse config {}", path.display()))
}

pub fn selection_policy(mode: RunMode) -> SelectionPolicy {
    match mode {
        RunMode::Extract => SelectionPolicy::AliasOrRowFallback,
        RunMode::Rebuild => SelectionPolicy::AliasOrRanked,
    }
}

pub fn normalize_options(mode: RunMode) -> NormalizeOptions {
    match mode {
        RunMode::Extract => NormalizeOptions::extract(),
        RunMode::Rebuild => NormalizeOptions::rebuild(),
    }
}

// ============================================================================
// Stage 1: Load
// ============================================================================

#[derive(Debug)]
pub struct LoadResult {
    pub strategy: &'static str,
    /// Sheets in workbook order, already filtered for the run mode.
    pub sheets: Vec<Sheet>,
}

/// Decodes the spreadsheet. Missing, markup or undecodable files are fatal.
pub fn load(config: &PipelineConfig, mode: RunMode) -> Result<LoadResult> {
    let path = &config.sources.spreadsheet;
    let workbook = TableLoader::default()
        .load(path)
        .with_context(|| format!("load spreadsheet {}", path.display()))?;

    let sheets: Vec<Sheet> = match mode {
        RunMode::Extract => workbook.first_sheet().cloned().into_iter().collect(),
        RunMode::Rebuild => workbook.non_empty_sheets().cloned().collect(),
    };
    info!(
        strategy = workbook.strategy,
        sheets = sheets.len(),
        total_sheets = workbook.sheets.len(),
        "spreadsheet loaded"
    );
    Ok(LoadResult {
        strategy: workbook.strategy,
        sheets,
    })
}

// ============================================================================
// Stage 2: Extract
// ============================================================================

#[derive(Debug)]
pub struct ExtractResult {
    /// Deduplicated registry in first-seen order.
    pub records: Vec<MedicationRecord>,
    pub sheets: Vec<SheetSummary>,
}

pub fn extract(sheets: &[Sheet], config: &PipelineConfig, mode: RunMode) -> ExtractResult {
    let policy = selection_policy(mode);
    let options = normalize_options(mode);
    let mut names = Vec::new();
    let mut summaries = Vec::with_capacity(sheets.len());

    for sheet in sheets {
        let choice = select_name_column(&sheet.table, &config.column_aliases, policy);
        debug!(sheet = %sheet.name, column = %choice.describe(), "name column selected");

        let mut accepted = 0usize;
        let mut rejected = 0usize;
        for raw in raw_candidates(&sheet.table, &choice) {
            match normalize_candidate(raw, &options) {
                Ok(name) => {
                    accepted += 1;
                    names.push(name);
                }
                Err(reason) => {
                    rejected += 1;
                    debug!(
                        sheet = %sheet.name,
                        value = raw,
                        reason = reason.as_str(),
                        "candidate rejected"
                    );
                }
            }
        }

        summaries.push(SheetSummary {
            name: sheet.name.clone(),
            rows: sheet.table.height(),
            column: choice.describe(),
            accepted,
            rejected,
        });
    }

    let records = build_registry(names, &config.country_code, &config.payer);
    info!(records = records.len(), "registry built");
    ExtractResult {
        records,
        sheets: summaries,
    }
}

// ============================================================================
// Stage 3: Scan
// ============================================================================

/// Prior-agreement candidates; empty for runs that do not scan.
pub fn scan(config: &PipelineConfig, mode: RunMode) -> Vec<String> {
    match mode {
        RunMode::Extract => scan_document(
            &config.sources.prior_agreement_document,
            config.pages_to_scan,
            &config.boilerplate,
        ),
        RunMode::Rebuild => Vec::new(),
    }
}

// ============================================================================
// Stage 4: Build
// ============================================================================

#[derive(Debug)]
pub struct Artifacts {
    pub rules: RulesDocument,
    pub rules_json: String,
    pub seed: SeedScript,
}

pub fn build(
    run: &PipelineRun,
    records: &[MedicationRecord],
    candidates: &[String],
) -> Result<Artifacts> {
    let config = &run.config;
    let spreadsheet = source_provenance(
        spreadsheet_source_name(run.mode),
        &config.sources.spreadsheet,
    )
    .context("checksum spreadsheet")?;
    let sources = match run.mode {
        RunMode::Extract => {
            let document = source_provenance(
                PRIOR_AGREEMENT_SOURCE_NAME,
                &config.sources.prior_agreement_document,
            )
            .context("checksum prior-agreement document")?;
            vec![document, spreadsheet]
        }
        RunMode::Rebuild => vec![spreadsheet],
    };

    let rules = build_rules(RulesInput {
        mode: run.mode,
        generated_at: run.generated_at,
        sources,
        candidates,
        prior_agreement_cap: config.prior_agreement_cap,
        country_code: &config.country_code,
        payer: &config.payer,
    });
    let rules_json = render_rules_json(&rules)?;
    let seed = render_seed_script(
        records,
        config.record_cap_for(run.mode),
        &SeedOptions::for_mode(run.mode),
    );
    Ok(Artifacts {
        rules,
        rules_json,
        seed,
    })
}

// ============================================================================
// Stage 5: Output
// ============================================================================

/// Replaces the rules document and the seed script together.
pub fn output(config: &PipelineConfig, artifacts: &Artifacts) -> Result<()> {
    let seed = artifacts.seed.to_sql();
    write_artifacts(&[
        (config.outputs.rules.as_path(), artifacts.rules_json.as_str()),
        (config.outputs.seed.as_path(), seed.as_str()),
    ])
    .with_context(|| {
        format!(
            "write outputs {} and {}",
            config.outputs.rules.display(),
            config.outputs.seed.display()
        )
    })?;
    Ok(())
}

/// Runs every stage.
pub fn run_pipeline(run: &PipelineRun) -> Result<RunResult> {
    let span = info_span!("pipeline", mode = run.mode.label());
    let _guard = span.enter();
    let config = &run.config;

    let loaded = load(config, run.mode)?;
    let extracted = extract(&loaded.sheets, config, run.mode);
    let candidates = scan(config, run.mode);
    let artifacts = build(run, &extracted.records, &candidates)?;

    if run.dry_run {
        info!("dry run, outputs not written");
    } else {
        output(config, &artifacts)?;
    }

    Ok(RunResult {
        mode: run.mode,
        spreadsheet: config.sources.spreadsheet.clone(),
        strategy: loaded.strategy,
        sheets: extracted.sheets,
        registry_size: extracted.records.len(),
        seeded: artifacts.seed.record_count,
        record_cap: config.record_cap_for(run.mode),
        prior_agreement_candidates: (run.mode == RunMode::Extract).then_some(candidates.len()),
        medication_rules: artifacts.rules.medication_rules.len(),
        rules_version: artifacts.rules.version,
        rules_path: config.outputs.rules.clone(),
        seed_path: config.outputs.seed.clone(),
        written: !run.dry_run,
    })
}
