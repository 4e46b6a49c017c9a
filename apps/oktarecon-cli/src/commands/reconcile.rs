//! `reconcile`: compare the source of truth with Okta and write a report.
//!
//! # Usage
//!
//! ```bash
//! oktarecon reconcile
//! oktarecon reconcile --output drift.json --only-discrepancies
//! oktarecon reconcile --fail-on-discrepancy   # for CI
//! ```

use clap::Args;
use oktarecon_connector_okta::OktaProvider;
use oktarecon_core::{reconcile, Record, RecordProvider, ReconciliationSummary};
use std::collections::BTreeSet;
use oktarecon_source::SourceProvider;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::{CliError, CliResult};
use crate::report::{format_summary, write_report, ReportFormat, ReportOptions};

/// Compare the source of truth with Okta
#[derive(Args, Debug, Default)]
#[command(after_help = "EXIT CODES:
    0  Completed (or no discrepancies with --fail-on-discrepancy)
    1  Discrepancies found with --fail-on-discrepancy
    2  Configuration error
    3  Network or Okta API error
    4  Duplicate or invalid records, malformed source
    5  Report could not be written
")]
pub struct ReconcileArgs {
    /// Report file (default: report.path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format (default: from report.format or the file extension)
    #[arg(short, long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Exit with code 1 when any discrepancy is found
    #[arg(long)]
    pub fail_on_discrepancy: bool,

    /// Leave MATCHED rows out of the report
    #[arg(long)]
    pub only_discrepancies: bool,
}

/// Outcome of a reconciliation run.
#[derive(Debug)]
pub struct ReconcileOutcome {
    pub summary: ReconciliationSummary,
    pub report_path: PathBuf,
    pub rows_written: usize,
}

/// Fetch both sides, reconcile and write the report.
pub async fn run(args: &ReconcileArgs, config: &AppConfig) -> CliResult<ReconcileOutcome> {
    let source = SourceProvider::new(config.require_source()?.clone())?;
    let okta = OktaProvider::new(config.okta.clone())?;

    let (source_records, okta_records) = tokio::try_join!(
        async { source.fetch_records().await.map_err(CliError::from) },
        async { okta.fetch_records().await.map_err(CliError::from) },
    )?;
    info!(
        source = source_records.len(),
        okta = okta_records.len(),
        "Fetched records"
    );

    if config.reconcile.compared_fields.is_none() {
        if let Some((source_names, okta_names)) =
            disjoint_attribute_names(&source_records, &okta_records)
        {
            warn!(
                source = ?source_names,
                okta = ?okta_names,
                "No attribute name is shared by both sides; every matched key will be MISMATCHED. \
                 Map source.fields to the okta attribute names or set reconcile.compared_fields"
            );
        }
    }

    let results = reconcile(&source_records, &okta_records, &config.reconcile)?;
    let summary = ReconciliationSummary::from_results(&results);

    let report_path = args
        .output
        .clone()
        .unwrap_or_else(|| config.report.path.clone());
    let format = args
        .format
        .or(config.report.format)
        .unwrap_or_else(|| ReportFormat::from_path(&report_path));

    let rows_written = write_report(
        &report_path,
        &results,
        &summary,
        &config.reconcile,
        ReportOptions {
            format,
            only_discrepancies: args.only_discrepancies || config.report.only_discrepancies,
            source_label: source.display_name(),
            okta_label: okta.display_name(),
        },
    )?;
    info!(rows = rows_written, path = %report_path.display(), "Report written");

    Ok(ReconcileOutcome {
        summary,
        report_path,
        rows_written,
    })
}

/// Attribute names seen on each side, returned only when both sides carry
/// attributes and no name appears on both.
pub fn disjoint_attribute_names<'a>(
    source: &'a [Record],
    okta: &'a [Record],
) -> Option<(BTreeSet<&'a str>, BTreeSet<&'a str>)> {
    let names = |records: &'a [Record]| -> BTreeSet<&'a str> {
        records
            .iter()
            .flat_map(|r| r.attributes.keys().map(String::as_str))
            .collect()
    };
    let source_names = names(source);
    let okta_names = names(okta);

    let disjoint = !source_names.is_empty()
        && !okta_names.is_empty()
        && source_names.is_disjoint(&okta_names);
    disjoint.then_some((source_names, okta_names))
}

/// Execute the reconcile command
pub async fn execute(args: ReconcileArgs, config: &AppConfig) -> CliResult<()> {
    let outcome = run(&args, config).await?;
    print!("{}", format_summary(&outcome.summary, &outcome.report_path));

    if args.fail_on_discrepancy && outcome.summary.has_discrepancies() {
        return Err(CliError::DiscrepanciesFound {
            count: outcome.summary.discrepancies(),
        });
    }
    Ok(())
}
