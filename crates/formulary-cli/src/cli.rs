//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "formulary",
    version,
    about = "Build the CNAM medication registry and reimbursement rules",
    long_about = "Build a deduplicated medication registry (SQL seed) and a versioned \
                  reimbursement rules document from the CNAM source lists.\n\n\
                  Output is best-effort and must be validated by a human."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Full run: spreadsheet plus prior-agreement document.
    Extract(ExtractArgs),

    /// Rebuild the registry from every sheet of the spreadsheet.
    Rebuild(RebuildArgs),

    /// Compute renewal dates from a rules document.
    Renewal(RenewalArgs),
}

/// Options shared by `extract` and `rebuild`.
#[derive(Args, Default)]
pub struct CommonArgs {
    /// JSON configuration file; flags override its values.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Spreadsheet of covered substances.
    #[arg(long = "spreadsheet", value_name = "PATH")]
    pub spreadsheet: Option<PathBuf>,

    /// Destination of the rules document.
    #[arg(long = "rules-out", value_name = "PATH")]
    pub rules_out: Option<PathBuf>,

    /// Destination of the SQL seed script.
    #[arg(long = "seed-out", value_name = "PATH")]
    pub seed_out: Option<PathBuf>,

    /// Maximum number of upserts in the seed script.
    #[arg(long = "record-cap", value_name = "N")]
    pub record_cap: Option<usize>,

    /// Header name identifying the substance column (repeatable; replaces
    /// the built-in list).
    #[arg(long = "alias", value_name = "NAME")]
    pub aliases: Vec<String>,

    /// Compute and report without writing outputs.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Prior-agreement list (PDF).
    #[arg(long = "prior-agreement-pdf", value_name = "PATH")]
    pub prior_agreement_pdf: Option<PathBuf>,

    /// Leading pages of the prior-agreement list to scan.
    #[arg(long = "pages", value_name = "N")]
    pub pages: Option<usize>,
}

#[derive(Args)]
pub struct RebuildArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args)]
pub struct RenewalArgs {
    /// Rules document produced by `extract` or `rebuild`.
    #[arg(long = "rules", value_name = "PATH")]
    pub rules: PathBuf,

    /// Treat the prescription as a chronic treatment.
    #[arg(long = "chronic")]
    pub chronic: bool,

    /// ATC code of a prescribed item (repeatable).
    #[arg(long = "atc", value_name = "CODE")]
    pub atc_codes: Vec<String>,

    /// Treatment duration of a prescribed item, in days (repeatable).
    #[arg(long = "duration", value_name = "DAYS")]
    pub durations: Vec<u32>,

    /// Also list prior-agreement rules matching this substance name.
    #[arg(long = "dci", value_name = "NAME")]
    pub dci: Option<String>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
