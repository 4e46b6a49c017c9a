//! Error types for the Okta connector.

use thiserror::Error;

/// Result type alias using `OktaError`.
pub type OktaResult<T> = Result<T, OktaError>;

/// Errors that can occur when reading from Okta.
#[derive(Debug, Error)]
pub enum OktaError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Okta API returned an error response.
    #[error("Okta API error ({status}): {code} - {summary}")]
    Api {
        status: u16,
        code: String,
        summary: String,
    },

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Maximum retry attempts exceeded.
    #[error("Maximum retries ({attempts}) exceeded for rate limit")]
    MaxRetriesExceeded { attempts: u32 },

    /// The origin application could not be found.
    #[error("Application not found: {0}")]
    AppNotFound(String),

    /// Okta returned something this client does not understand.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl OktaError {
    /// Whether the error indicates bad or insufficient credentials.
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        matches!(self, OktaError::Api { status: 401 | 403, .. })
    }
}
