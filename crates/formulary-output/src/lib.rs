//! Artifact generation: the rules document and the database seed script.

pub mod error;
pub mod rules;
pub mod seed;
pub mod writer;

pub use error::{OutputError, Result};
pub use rules::{RulesInput, build_rules, format_generated_at, render_rules_json};
pub use seed::{SeedOptions, SeedScript, render_seed_script, sql_literal};
pub use writer::{write_artifact, write_artifacts};
