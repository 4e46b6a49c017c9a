//! Configuration loading for the oktarecon CLI.
//!
//! Settings come from a YAML file, then a `.env` file and the process
//! environment override the Okta connection fields.

use oktarecon_connector_okta::{OktaConfig, OriginAppConfig};
use oktarecon_core::ReconcileConfig;
use oktarecon_source::SourceConfig;
use secrecy::SecretString;
use serde::Deserialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::error::{CliError, CliResult};
use crate::logging::LogFormat;
use crate::report::ReportFormat;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Source of truth export. Required for `reconcile`.
    #[serde(default)]
    pub source: Option<SourceConfig>,
    #[serde(default)]
    pub okta: OktaConfig,
    #[serde(default)]
    pub reconcile: ReconcileConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Report output settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub format: Option<ReportFormat>,
    #[serde(default)]
    pub only_discrepancies: bool,
    #[serde(default = "default_origin_report_path")]
    pub origin_report_path: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: default_report_path(),
            format: None,
            only_discrepancies: false,
            origin_report_path: default_origin_report_path(),
        }
    }
}

fn default_report_path() -> PathBuf {
    PathBuf::from("okta_reconciliation_report.csv")
}

fn default_origin_report_path() -> PathBuf {
    PathBuf::from("okta_user_source_report.csv")
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load a configuration file, apply `.env` and environment overrides,
    /// then validate.
    pub fn load<P: AsRef<Path>>(path: P) -> CliResult<Self> {
        // A missing .env is fine.
        let _ = dotenvy::dotenv();

        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> CliResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            CliError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(content: &str) -> CliResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| CliError::Config(format!("Failed to parse config: {e}")))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides using `lookup` to read variables.
    ///
    /// Recognized: `OKTA_DOMAIN`, `OKTA_API_TOKEN`, `BOB_APP_ID`, `BOB_APP_LABEL`.
    /// Blank values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(domain) = var("OKTA_DOMAIN") {
            self.okta.domain = domain.trim().to_string();
        }
        if let Some(token) = var("OKTA_API_TOKEN") {
            self.okta.api_token = Some(SecretString::new(token.trim().to_string()));
        }

        let app_id = var("BOB_APP_ID");
        let app_label = var("BOB_APP_LABEL");
        if app_id.is_some() || app_label.is_some() {
            let app = self.okta.origin_app.get_or_insert_with(OriginAppConfig::default);
            if let Some(id) = app_id {
                app.app_id = Some(id.trim().to_string());
            }
            if let Some(label) = app_label {
                app.app_label = Some(label.trim().to_string());
            }
        }
    }

    /// Validate every section.
    pub fn validate(&self) -> CliResult<()> {
        self.okta.validate()?;
        if let Some(source) = &self.source {
            source.validate()?;
        }
        if let Some(fields) = &self.reconcile.compared_fields {
            if fields.is_empty() {
                return Err(CliError::Config(
                    "reconcile.compared_fields must not be empty; omit it to compare all attributes"
                        .to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Source configuration, required by `reconcile`.
    pub fn require_source(&self) -> CliResult<&SourceConfig> {
        self.source
            .as_ref()
            .ok_or_else(|| CliError::Config("missing 'source' section".to_string()))
    }

    /// Human-readable summary with the API token redacted.
    #[must_use]
    pub fn redacted_summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Okta");
        let _ = writeln!(out, "  domain:          {}", self.okta.normalized_domain());
        let token = if self.okta.token().is_ok() {
            "set (redacted)"
        } else {
            "not set"
        };
        let _ = writeln!(out, "  api_token:       {token}");
        let _ = writeln!(out, "  identity_field:  {}", self.okta.identity_field.path());
        let _ = writeln!(out, "  page_size:       {}", self.okta.page_size);
        if let Some(filter) = &self.okta.user_filter {
            let _ = writeln!(out, "  user_filter:     {filter}");
        }
        match &self.okta.origin_app {
            Some(app) => {
                let _ = writeln!(
                    out,
                    "  origin_app:      id={} label={}",
                    app.app_id.as_deref().unwrap_or("-"),
                    app.app_label.as_deref().unwrap_or("-")
                );
            }
            None => {
                let _ = writeln!(out, "  origin_app:      not configured");
            }
        }

        let _ = writeln!(out, "Source");
        match &self.source {
            Some(source) => {
                let _ = writeln!(out, "  path:            {}", source.path.display());
                let _ = writeln!(out, "  identity_field:  {}", source.identity_field);
                if !source.fields.is_empty() {
                    let names: Vec<&str> = source.fields.keys().map(String::as_str).collect();
                    let _ = writeln!(out, "  fields:          {}", names.join(", "));
                }
            }
            None => {
                let _ = writeln!(out, "  not configured");
            }
        }

        let _ = writeln!(out, "Reconcile");
        let compared = match &self.reconcile.compared_fields {
            Some(fields) => fields.iter().cloned().collect::<Vec<_>>().join(", "),
            None => "all attributes".to_string(),
        };
        let _ = writeln!(out, "  compared_fields: {compared}");
        let _ = writeln!(out, "  key_normalization: {:?}", self.reconcile.key_normalization);
        let _ = writeln!(out, "  ignore_value_case: {}", self.reconcile.ignore_value_case);

        let _ = writeln!(out, "Report");
        let _ = writeln!(out, "  path:            {}", self.report.path.display());
        out
    }
}
