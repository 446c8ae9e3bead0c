use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use comfy_table::Table;
use tracing::info;

use formulary_cli::pipeline::{PipelineRun, load_config, run_pipeline};
use formulary_cli::types::RunResult;
use formulary_model::renewal::{compute_dates, compute_renewal};
use formulary_model::{PipelineConfig, RenewalRequest, RulesDocument, RunMode};

use crate::cli::{CommonArgs, ExtractArgs, RebuildArgs, RenewalArgs};
use crate::summary::{apply_table_style, header_cell};

pub fn run_extract(args: &ExtractArgs) -> Result<RunResult> {
    let mut config = resolve_config(&args.common)?;
    if let Some(path) = &args.prior_agreement_pdf {
        config.sources.prior_agreement_document = path.clone();
    }
    if let Some(pages) = args.pages {
        config.pages_to_scan = pages;
    }
    run(RunMode::Extract, config, args.common.dry_run)
}

pub fn run_rebuild(args: &RebuildArgs) -> Result<RunResult> {
    let config = resolve_config(&args.common)?;
    run(RunMode::Rebuild, config, args.common.dry_run)
}

fn run(mode: RunMode, config: PipelineConfig, dry_run: bool) -> Result<RunResult> {
    let run = PipelineRun {
        dry_run,
        ..PipelineRun::new(mode, config)
    };
    info!(
        mode = mode.label(),
        spreadsheet = %run.config.sources.spreadsheet.display(),
        dry_run,
        "starting run"
    );
    run_pipeline(&run)
}

/// Configuration file (or defaults) with command-line overrides applied.
fn resolve_config(args: &CommonArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => PipelineConfig::default(),
    };
    apply_overrides(&mut config, args);
    Ok(config)
}

fn apply_overrides(config: &mut PipelineConfig, args: &CommonArgs) {
    if let Some(path) = &args.spreadsheet {
        config.sources.spreadsheet = path.clone();
    }
    if let Some(path) = &args.rules_out {
        config.outputs.rules = path.clone();
    }
    if let Some(path) = &args.seed_out {
        config.outputs.seed = path.clone();
    }
    if args.record_cap.is_some() {
        config.record_cap = args.record_cap;
    }
    if !args.aliases.is_empty() {
        config.column_aliases = args.aliases.clone();
    }
}

pub fn run_renewal(args: &RenewalArgs) -> Result<()> {
    let content = std::fs::read_to_string(&args.rules)
        .with_context(|| format!("read rules {}", args.rules.display()))?;
    let rules: RulesDocument = serde_json::from_str(&content)
        .with_context(|| format!("parse rules {}", args.rules.display()))?;

    let request = RenewalRequest {
        is_chronic: args.chronic,
        atc_codes: args.atc_codes.clone(),
        duration_days: args.durations.clone(),
    };
    let decision = compute_renewal(&rules, &request);
    let dates = compute_dates(Utc::now(), &decision).with_context(|| {
        format!(
            "renewal dates out of range for {} dispense days",
            decision.dispense_days
        )
    })?;

    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Value")]);
    apply_table_style(&mut table);
    let rows = [
        (
            "Rules",
            format!("{} {} v{}", rules.country, rules.payer, rules.version),
        ),
        ("Reason", decision.reason.to_string()),
        ("Dispense days", decision.dispense_days.to_string()),
        (
            "Appointment offset",
            format!("{} days", decision.appointment_offset_days),
        ),
        ("Lead days", decision.lead_days.to_string()),
        ("Renewal due", format_date(dates.renewal_due)),
        ("Next appointment", format_date(dates.next_appointment)),
        ("Remind at", format_date(dates.remind_at)),
    ];
    for (label, value) in rows {
        table.add_row(vec![label.to_string(), value]);
    }

    if let Some(dci) = &args.dci {
        let matches: Vec<String> = rules
            .prior_agreement_rules(dci)
            .into_iter()
            .map(|rule| rule.label.clone())
            .collect();
        let value = if matches.is_empty() {
            "none".to_string()
        } else {
            matches.join("\n")
        };
        table.add_row(vec![format!("Prior agreement ({dci})"), value]);
    }

    println!("{table}");
    println!("{}", rules.disclaimer);
    Ok(())
}

fn format_date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}
