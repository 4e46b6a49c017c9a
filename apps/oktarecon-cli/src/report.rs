//! Report writers for reconciliation results and the user origin report.
//!
//! CSV layout, one row per identity key:
//! `identity_key, classification, differing_fields` followed by a
//! `source.<field>` / `okta.<field>` column pair per compared field.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use oktarecon_connector_okta::OriginReportRow;
use oktarecon_core::{Classification, ComparisonResult, ReconcileConfig, ReconciliationSummary};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{CliError, CliResult};

/// Reconciliation report format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Spreadsheet-friendly CSV (default)
    #[default]
    Csv,
    /// JSON document with summary and results
    Json,
}

impl ReportFormat {
    /// Infer from the output file extension, defaulting to CSV.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ReportFormat::Json,
            _ => ReportFormat::Csv,
        }
    }
}

/// JSON report document.
#[derive(Debug, Serialize)]
pub struct ReconciliationReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub source_label: &'a str,
    pub okta_label: &'a str,
    pub summary: &'a ReconciliationSummary,
    pub results: Vec<&'a ComparisonResult<'a>>,
}

/// Fields shown as value columns: the configured compared fields, or the
/// sorted union of every attribute seen on either side.
#[must_use]
pub fn report_fields(results: &[ComparisonResult<'_>], config: &ReconcileConfig) -> Vec<String> {
    if let Some(fields) = &config.compared_fields {
        return fields.iter().cloned().collect();
    }

    let mut fields = BTreeSet::new();
    for result in results {
        for record in [result.source_record, result.okta_record].into_iter().flatten() {
            fields.extend(record.attributes.keys().map(String::as_str));
        }
    }
    fields.into_iter().map(str::to_string).collect()
}

fn selected<'r, 'a>(
    results: &'r [ComparisonResult<'a>],
    only_discrepancies: bool,
) -> impl Iterator<Item = &'r ComparisonResult<'a>> {
    results
        .iter()
        .filter(move |r| !only_discrepancies || r.classification.is_discrepancy())
}

/// Write results as CSV. Returns the number of data rows written.
pub fn write_csv<W: Write>(
    results: &[ComparisonResult<'_>],
    fields: &[String],
    only_discrepancies: bool,
    writer: W,
) -> CliResult<usize> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec![
        "identity_key".to_string(),
        "classification".to_string(),
        "differing_fields".to_string(),
    ];
    for field in fields {
        header.push(format!("source.{field}"));
        header.push(format!("okta.{field}"));
    }
    wtr.write_record(&header)?;

    let mut rows = 0;
    for result in selected(results, only_discrepancies) {
        let mut row = Vec::with_capacity(header.len());
        row.push(result.identity_key.clone());
        row.push(result.classification.as_str().to_string());
        row.push(result.differing_fields.join(";"));
        for field in fields {
            row.push(result.source_value(field).unwrap_or_default().to_string());
            row.push(result.okta_value(field).unwrap_or_default().to_string());
        }
        wtr.write_record(&row)?;
        rows += 1;
    }

    wtr.flush()
        .map_err(|e| CliError::Report(format!("Failed to flush CSV: {e}")))?;
    Ok(rows)
}

/// Write results as a JSON document. Returns the number of results written.
pub fn write_json<W: Write>(
    results: &[ComparisonResult<'_>],
    summary: &ReconciliationSummary,
    labels: (&str, &str),
    only_discrepancies: bool,
    mut writer: W,
) -> CliResult<usize> {
    let report = ReconciliationReport {
        generated_at: Utc::now(),
        source_label: labels.0,
        okta_label: labels.1,
        summary,
        results: selected(results, only_discrepancies).collect(),
    };
    let count = report.results.len();

    serde_json::to_writer_pretty(&mut writer, &report)?;
    writeln!(writer).map_err(|e| CliError::Report(e.to_string()))?;
    writer
        .flush()
        .map_err(|e| CliError::Report(format!("Failed to flush JSON: {e}")))?;
    Ok(count)
}

fn create_file(path: &Path) -> CliResult<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| CliError::Report(format!("{}: {e}", path.display())))
}

/// Options for [`write_report`].
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions<'a> {
    pub format: ReportFormat,
    pub only_discrepancies: bool,
    pub source_label: &'a str,
    pub okta_label: &'a str,
}

/// Write the reconciliation report to `path`. Returns the rows written.
pub fn write_report(
    path: &Path,
    results: &[ComparisonResult<'_>],
    summary: &ReconciliationSummary,
    config: &ReconcileConfig,
    options: ReportOptions<'_>,
) -> CliResult<usize> {
    let file = create_file(path)?;
    match options.format {
        ReportFormat::Csv => {
            let fields = report_fields(results, config);
            write_csv(results, &fields, options.only_discrepancies, file)
        }
        ReportFormat::Json => write_json(
            results,
            summary,
            (options.source_label, options.okta_label),
            options.only_discrepancies,
            file,
        ),
    }
}

/// Write the origin report as CSV. Returns the rows written.
pub fn write_origin_report<W: Write>(rows: &[OriginReportRow], writer: W) -> CliResult<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        wtr.write_record([
            "User ID",
            "First Name",
            "Last Name",
            "Email",
            "Origin",
            "Okta Configuration Status",
        ])?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()
        .map_err(|e| CliError::Report(format!("Failed to flush CSV: {e}")))?;
    Ok(rows.len())
}

/// Write the origin report to `path`.
pub fn write_origin_report_file(path: &Path, rows: &[OriginReportRow]) -> CliResult<usize> {
    write_origin_report(rows, create_file(path)?)
}

/// Terminal summary printed after a reconciliation run.
#[must_use]
pub fn format_summary(summary: &ReconciliationSummary, report_path: &Path) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Reconciliation summary");
    let _ = writeln!(
        out,
        "  source records: {}  okta records: {}",
        summary.source_records, summary.okta_records
    );
    for classification in Classification::all() {
        let _ = writeln!(
            out,
            "  {:<15} {}",
            classification.as_str(),
            summary.count(*classification)
        );
    }
    let _ = writeln!(out, "  {:<15} {}", "TOTAL", summary.total);

    if !summary.top_mismatched_attributes.is_empty() {
        let _ = writeln!(out, "Most frequently mismatched attributes");
        for item in summary.top_mismatched_attributes.iter().take(5) {
            let _ = writeln!(out, "  {:<15} {}", item.attribute, item.count);
        }
    }

    let _ = writeln!(out, "Report written to {}", report_path.display());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use oktarecon_core::{reconcile, Origin, Record};

    fn fixtures() -> (Vec<Record>, Vec<Record>) {
        let source = vec![
            Record::new("a@x.com", Origin::Source)
                .with_attribute("first_name", "Ann")
                .with_attribute("status", "active"),
            Record::new("b@x.com", Origin::Source).with_attribute("status", "active"),
            Record::new("c@x.com", Origin::Source).with_attribute("status", "active"),
        ];
        let okta = vec![
            Record::new("a@x.com", Origin::Okta)
                .with_attribute("first_name", "Ann")
                .with_attribute("status", "suspended"),
            Record::new("c@x.com", Origin::Okta).with_attribute("status", "active"),
            Record::new("d@x.com", Origin::Okta).with_attribute("status", "active"),
        ];
        (source, okta)
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ReportFormat::from_path(Path::new("out.JSON")), ReportFormat::Json);
        assert_eq!(ReportFormat::from_path(Path::new("out.csv")), ReportFormat::Csv);
        assert_eq!(ReportFormat::from_path(Path::new("out")), ReportFormat::Csv);
    }

    #[test]
    fn test_report_fields_union_and_configured() {
        let (source, okta) = fixtures();
        let config = ReconcileConfig::default();
        let results = reconcile(&source, &okta, &config).unwrap();
        assert_eq!(report_fields(&results, &config), vec!["first_name", "status"]);

        let config = ReconcileConfig::default().with_compared_fields(["status"]);
        assert_eq!(report_fields(&results, &config), vec!["status"]);
    }

    #[test]
    fn test_write_csv() {
        let (source, okta) = fixtures();
        let config = ReconcileConfig::default();
        let results = reconcile(&source, &okta, &config).unwrap();
        let fields = report_fields(&results, &config);

        let mut buf = Vec::new();
        let rows = write_csv(&results, &fields, false, &mut buf).unwrap();
        assert_eq!(rows, 4);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "identity_key,classification,differing_fields,source.first_name,okta.first_name,source.status,okta.status"
        );
        assert_eq!(lines[1], "a@x.com,MISMATCHED,status,Ann,Ann,active,suspended");
        assert_eq!(lines[2], "b@x.com,ONLY_IN_SOURCE,,,,active,");
        assert_eq!(lines[3], "c@x.com,MATCHED,,,,active,active");
        assert_eq!(lines[4], "d@x.com,ONLY_IN_OKTA,,,,,active");
    }

    #[test]
    fn test_write_csv_only_discrepancies() {
        let (source, okta) = fixtures();
        let config = ReconcileConfig::default();
        let results = reconcile(&source, &okta, &config).unwrap();

        let mut buf = Vec::new();
        let rows = write_csv(&results, &[], true, &mut buf).unwrap();
        assert_eq!(rows, 3);
        let text = String::from_utf8(buf).unwrap();
        assert!(!text.contains(",MATCHED,"));
        assert!(text.contains(",MISMATCHED,"));
    }

    #[test]
    fn test_write_json() {
        let (source, okta) = fixtures();
        let results = reconcile(&source, &okta, &ReconcileConfig::default()).unwrap();
        let summary = ReconciliationSummary::from_results(&results);

        let mut buf = Vec::new();
        let count = write_json(&results, &summary, ("hibob.csv", "Okta"), false, &mut buf).unwrap();
        assert_eq!(count, 4);

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["source_label"], "hibob.csv");
        assert_eq!(value["summary"]["mismatched"], 1);
        assert_eq!(value["results"][0]["classification"], "MISMATCHED");
        assert_eq!(value["results"][0]["differing_fields"][0], "status");
        assert!(value["results"][1].get("okta_record").is_none());
        assert!(value["generated_at"].is_string());
    }

    /// Sink that rejects every write, like a full disk.
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "No space left on device",
            ))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_json_reports_buffered_write_failure() {
        let (source, okta) = fixtures();
        let results = reconcile(&source, &okta, &ReconcileConfig::default()).unwrap();
        let summary = ReconciliationSummary::from_results(&results);

        let err = write_json(
            &results,
            &summary,
            ("hibob.csv", "Okta"),
            false,
            BufWriter::new(FullDisk),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Report(_)));
        assert_eq!(err.exit_code(), 5);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_write_report_to_full_device_fails_for_every_format() {
        let (source, okta) = fixtures();
        let config = ReconcileConfig::default();
        let results = reconcile(&source, &okta, &config).unwrap();
        let summary = ReconciliationSummary::from_results(&results);

        for format in [ReportFormat::Csv, ReportFormat::Json] {
            let options = ReportOptions {
                format,
                only_discrepancies: false,
                source_label: "hibob.csv",
                okta_label: "Okta",
            };
            let err = write_report(Path::new("/dev/full"), &results, &summary, &config, options)
                .unwrap_err();
            assert_eq!(err.exit_code(), 5, "{format:?}");
        }
    }

    #[test]
    fn test_origin_report_columns() {
        let rows = vec![OriginReportRow {
            user_id: "00u1".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@example.com".into(),
            origin: "Imported (bob)".into(),
            configuration_status: "Imported (bob)".into(),
        }];
        let mut buf = Vec::new();
        assert_eq!(write_origin_report(&rows, &mut buf).unwrap(), 1);

        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("User ID,First Name,Last Name,Email,Origin,Okta Configuration Status")
        );
        assert_eq!(
            lines.next(),
            Some("00u1,Jane,Doe,jane@example.com,Imported (bob),Imported (bob)")
        );
    }

    #[test]
    fn test_empty_origin_report_has_header() {
        let mut buf = Vec::new();
        assert_eq!(write_origin_report(&[], &mut buf).unwrap(), 0);
        assert!(String::from_utf8(buf).unwrap().starts_with("User ID,"));
    }

    #[test]
    fn test_format_summary() {
        let (source, okta) = fixtures();
        let results = reconcile(&source, &okta, &ReconcileConfig::default()).unwrap();
        let summary = ReconciliationSummary::from_results(&results);

        let text = format_summary(&summary, Path::new("report.csv"));
        assert!(text.contains("MISMATCHED"));
        assert!(text.contains("TOTAL"));
        assert!(text.contains("status"));
        assert!(text.ends_with("Report written to report.csv\n"));
    }
}
