//! CLI error types and exit codes

use oktarecon_connector_okta::OktaError;
use oktarecon_core::ReconcileError;
use oktarecon_source::SourceError;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: Discrepancies found (with --fail-on-discrepancy)
/// - 2: Configuration error
/// - 3: Network or Okta API error
/// - 4: Data integrity error
/// - 5: Report I/O error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{count} discrepancies found")]
    DiscrepanciesFound { count: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot read source file: {0}")]
    SourceUnreadable(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Okta API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Okta rejected the API token (status {status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Origin application not found: {0}")]
    AppNotFound(String),

    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Failed to write report: {0}")]
    Report(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::DiscrepanciesFound { .. } => 1,
            CliError::Config(_) | CliError::SourceUnreadable(_) | CliError::AppNotFound(_) => 2,
            CliError::Network(_) | CliError::Api { .. } | CliError::Unauthorized { .. } => 3,
            CliError::DataIntegrity(_) => 4,
            CliError::Report(_) => 5,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    /// Get a suggested action for this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::DiscrepanciesFound { .. } => {
                Some("Review the report, or drop --fail-on-discrepancy to exit 0.")
            }
            CliError::Config(_) => Some("Run 'oktarecon validate-config' to check your settings."),
            CliError::SourceUnreadable(_) => Some("Check source.path in your configuration."),
            CliError::Unauthorized { .. } => {
                Some("Check OKTA_API_TOKEN and that the token has read access to users and apps.")
            }
            CliError::AppNotFound(_) => {
                Some("Set BOB_APP_ID (or okta.origin_app.app_id) to the exact application ID.")
            }
            CliError::DataIntegrity(_) => {
                Some("Fix the offending rows in the input; duplicate keys are never merged.")
            }
            _ => None,
        }
    }
}

impl From<OktaError> for CliError {
    fn from(e: OktaError) -> Self {
        if e.is_auth_error() {
            if let OktaError::Api {
                status, summary, ..
            } = e
            {
                return CliError::Unauthorized {
                    status,
                    message: summary,
                };
            }
        }

        match e {
            OktaError::Config(msg) => CliError::Config(format!("okta: {msg}")),
            OktaError::AppNotFound(msg) => CliError::AppNotFound(msg),
            OktaError::Api {
                status,
                code,
                summary,
            } => CliError::Api {
                status,
                message: format!("{code} - {summary}"),
            },
            OktaError::Http(e) if e.is_timeout() => {
                CliError::Network("Request timed out".to_string())
            }
            other => CliError::Network(other.to_string()),
        }
    }
}

impl From<SourceError> for CliError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::Io { .. } => CliError::SourceUnreadable(e.to_string()),
            SourceError::Config(_) | SourceError::UnsupportedFormat(_) => {
                CliError::Config(format!("source: {e}"))
            }
            other => CliError::DataIntegrity(other.to_string()),
        }
    }
}

impl From<ReconcileError> for CliError {
    fn from(e: ReconcileError) -> Self {
        CliError::DataIntegrity(e.to_string())
    }
}

impl From<csv::Error> for CliError {
    fn from(e: csv::Error) -> Self {
        CliError::Report(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Report(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oktarecon_core::Origin;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::DiscrepanciesFound { count: 2 }.exit_code(), 1);
        assert_eq!(CliError::Config("x".into()).exit_code(), 2);
        assert_eq!(CliError::Network("x".into()).exit_code(), 3);
        assert_eq!(CliError::DataIntegrity("x".into()).exit_code(), 4);
        assert_eq!(CliError::Report("x".into()).exit_code(), 5);
    }

    #[test]
    fn test_okta_auth_error_maps_to_unauthorized() {
        let err: CliError = OktaError::Api {
            status: 401,
            code: "E0000011".into(),
            summary: "Invalid token provided".into(),
        }
        .into();
        assert!(matches!(err, CliError::Unauthorized { status: 401, .. }));
        assert_eq!(err.exit_code(), 3);
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_okta_forbidden_maps_to_unauthorized() {
        let err: CliError = OktaError::Api {
            status: 403,
            code: "E0000006".into(),
            summary: "You do not have permission to perform the requested action".into(),
        }
        .into();
        assert!(matches!(err, CliError::Unauthorized { status: 403, .. }));

        let not_found: CliError = OktaError::Api {
            status: 404,
            code: "E0000007".into(),
            summary: "Not found".into(),
        }
        .into();
        assert!(matches!(not_found, CliError::Api { status: 404, .. }));
    }

    #[test]
    fn test_okta_config_error_is_config() {
        let err: CliError = OktaError::Config("domain is required".into()).into();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "Configuration error: okta: domain is required");
    }

    #[test]
    fn test_rate_limit_exhaustion_is_network() {
        let err: CliError = OktaError::MaxRetriesExceeded { attempts: 10 }.into();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_reconcile_errors_are_data_integrity() {
        let err: CliError = ReconcileError::DuplicateKey {
            origin: Origin::Okta,
            key: "a@x.com".into(),
        }
        .into();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("duplicate identity key 'a@x.com'"));
    }

    #[test]
    fn test_source_errors() {
        let parse: CliError = SourceError::InvalidRow {
            row: 3,
            message: "missing identity value".into(),
        }
        .into();
        assert_eq!(parse.exit_code(), 4);

        let format: CliError = SourceError::UnsupportedFormat("xlsx".into()).into();
        assert_eq!(format.exit_code(), 2);
    }
}
