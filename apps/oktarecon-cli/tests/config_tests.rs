//! Integration tests for configuration files on disk.

use oktarecon_cli::config::AppConfig;
use oktarecon_cli::error::CliError;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(
        &path,
        "okta:\n  domain: acme.okta.com\n  api_token: 00abc\n  page_size: 50\n",
    )
    .unwrap();

    let config = AppConfig::from_file(&path).unwrap();
    assert_eq!(config.okta.page_size, 50);
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let err = AppConfig::from_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, CliError::Config(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_out_of_range_page_size_rejected() {
    let config =
        AppConfig::from_yaml("okta:\n  domain: acme.okta.com\n  api_token: x\n  page_size: 500\n")
            .unwrap();
    let err = config.validate().unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("page_size"));
}

#[test]
fn test_source_with_unknown_extension_rejected() {
    let yaml = "\
source:
  path: export.xlsx
  identity_field: email
okta:
  domain: acme.okta.com
  api_token: x
";
    let config = AppConfig::from_yaml(yaml).unwrap();
    assert!(matches!(config.validate(), Err(CliError::Config(_))));
}

#[test]
fn test_sample_config_parses() {
    let sample = include_str!("../../../demos/config.yaml");
    let config = AppConfig::from_yaml(sample).unwrap();
    assert!(config.source.is_some());
    assert!(config.okta.origin_app.is_some());
}
