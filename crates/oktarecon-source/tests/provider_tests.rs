//! Integration tests for reading source exports from disk.

use oktarecon_core::{Origin, RecordProvider};
use oktarecon_source::{SourceConfig, SourceError, SourceFormat, SourceProvider};
use std::fs;
use tempfile::TempDir;

/// Write a fixture file into the temp dir and return its path.
fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

#[tokio::test]
async fn test_reads_csv_export() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "hibob.csv",
        "Email,First Name,Status\njane@example.com,Jane,active\nbob@example.com,Bob,terminated\n",
    );

    let provider = SourceProvider::new(
        SourceConfig::new(&path, "Email")
            .with_field("first_name", "First Name")
            .with_field("status", "Status"),
    )
    .unwrap();

    assert_eq!(provider.origin(), Origin::Source);
    assert_eq!(provider.display_name(), path.display().to_string());

    let records = provider.fetch_records().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].identity_key, "bob@example.com");
    assert_eq!(records[1].attribute("status"), Some("terminated"));
}

#[tokio::test]
async fn test_reads_json_export() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "users.json",
        r#"[{"email": "jane@example.com", "status": "active"}]"#,
    );

    let provider = SourceProvider::new(SourceConfig::new(&path, "email")).unwrap();
    let records = provider.fetch_records().await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].attribute("status"), Some("active"));
}

#[tokio::test]
async fn test_explicit_format_for_unusual_extension() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "users.export", "email\na@x.com\n");

    let provider =
        SourceProvider::new(SourceConfig::new(&path, "email").with_format(SourceFormat::Csv))
            .unwrap();
    let records = provider.fetch_records().await.unwrap();

    assert_eq!(records.len(), 1);
    assert!(records[0].attributes.is_empty());
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.csv");

    let provider = SourceProvider::new(SourceConfig::new(&path, "email")).unwrap();
    let err = provider.fetch_records().await.unwrap_err();

    match err {
        SourceError::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn test_unknown_extension_rejected_at_construction() {
    let result = SourceProvider::new(SourceConfig::new("users.xlsx", "email"));
    assert!(matches!(result, Err(SourceError::UnsupportedFormat(_))));
}
