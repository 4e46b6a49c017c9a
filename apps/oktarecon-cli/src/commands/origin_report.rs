//! `origin-report`: classify every Okta user as imported through the origin
//! application or created manually.

use clap::Args;
use oktarecon_connector_okta::{OktaProvider, OriginReport};
use std::path::PathBuf;
use tracing::info;

use crate::config::AppConfig;
use crate::error::{CliError, CliResult};
use crate::report::write_origin_report_file;

/// Report which Okta users came from the origin application
#[derive(Args, Debug, Default)]
#[command(after_help = "EXAMPLES:
    # Identify the app by label (or set BOB_APP_ID for an exact id)
    BOB_APP_LABEL=HiBob oktarecon origin-report

    # Write somewhere else
    oktarecon origin-report --output users_by_origin.csv
")]
pub struct OriginReportArgs {
    /// Output CSV file (default: report.origin_report_path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Outcome of an origin report run.
#[derive(Debug)]
pub struct OriginReportOutcome {
    pub path: PathBuf,
    pub report: OriginReport,
}

/// Fetch, classify and write the origin report.
pub async fn run(args: &OriginReportArgs, config: &AppConfig) -> CliResult<OriginReportOutcome> {
    if config.okta.origin_app.is_none() {
        return Err(CliError::Config(
            "origin-report needs okta.origin_app, BOB_APP_ID or BOB_APP_LABEL".to_string(),
        ));
    }

    let provider = OktaProvider::new(config.okta.clone())?;
    let report = provider.origin_report().await?;

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| config.report.origin_report_path.clone());
    let rows = write_origin_report_file(&path, &report.rows)?;
    info!(rows, path = %path.display(), "Origin report written");

    Ok(OriginReportOutcome { path, report })
}

/// Execute the origin-report command
pub async fn execute(args: OriginReportArgs, config: &AppConfig) -> CliResult<()> {
    let outcome = run(&args, config).await?;

    println!("Report generated successfully: {}", outcome.path.display());
    println!("Total users processed: {}", outcome.report.rows.len());
    println!(
        "Imported through origin app: {}",
        outcome.report.imported_count()
    );
    println!("Origin app id used: {}", outcome.report.app_id);
    Ok(())
}
