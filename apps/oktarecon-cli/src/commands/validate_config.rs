//! `validate-config`: load, apply overrides, validate and print a redacted summary.

use clap::Args;

use crate::config::AppConfig;
use crate::error::CliResult;

/// Check the configuration without contacting Okta
#[derive(Args, Debug, Default)]
pub struct ValidateConfigArgs {}

/// Execute the validate-config command
pub fn execute(_args: ValidateConfigArgs, config: &AppConfig) -> CliResult<()> {
    print!("{}", config.redacted_summary());
    println!("\nConfiguration is valid.");
    Ok(())
}
