//! Subcommand implementations.

pub mod origin_report;
pub mod reconcile;
pub mod validate_config;
