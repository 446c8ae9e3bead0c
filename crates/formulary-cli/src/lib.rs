//! CLI library components for the formulary pipeline.

pub mod logging;
pub mod pipeline;
pub mod types;
