//! oktarecon - reconcile a source of truth (e.g. a HiBob export) against Okta
//!
//! Subcommands:
//! - `reconcile`: classify every identity and write a CSV or JSON report
//! - `origin-report`: list Okta users as imported or manually created
//! - `validate-config`: check configuration without contacting Okta

use clap::{Parser, Subcommand};
use oktarecon_cli::commands;
use oktarecon_cli::config::AppConfig;
use oktarecon_cli::error::CliResult;
use oktarecon_cli::logging::{init_logging, LogFormat};
use std::path::PathBuf;

/// oktarecon - identity reconciliation against Okta
#[derive(Parser)]
#[command(name = "oktarecon")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, env = "OKTARECON_CONFIG", default_value = "config.yaml")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (overrides logging.format)
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the source of truth with Okta and write a report
    Reconcile(commands::reconcile::ReconcileArgs),

    /// Report which Okta users were imported through the origin app
    OriginReport(commands::origin_report::OriginReportArgs),

    /// Validate configuration and print a redacted summary
    ValidateConfig(commands::validate_config::ValidateConfigArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = AppConfig::load(&cli.config)?;

    init_logging(
        &config.logging.level,
        cli.verbose,
        cli.log_format.unwrap_or(config.logging.format),
    )?;

    match cli.command {
        Commands::Reconcile(args) => commands::reconcile::execute(args, &config).await,
        Commands::OriginReport(args) => commands::origin_report::execute(args, &config).await,
        Commands::ValidateConfig(args) => commands::validate_config::execute(args, &config),
    }
}
