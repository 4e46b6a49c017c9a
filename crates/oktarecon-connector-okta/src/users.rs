//! Okta user model and listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use tracing::{info, instrument};

use crate::client::OktaClient;
use crate::OktaResult;

/// `credentials.provider` of an Okta user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialProvider {
    #[serde(rename = "type", default)]
    pub provider_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// `credentials` of an Okta user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredentials {
    #[serde(default)]
    pub provider: Option<CredentialProvider>,
}

/// User as returned by `GET /api/v1/users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OktaUser {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub profile: Map<String, Value>,
    #[serde(default)]
    pub credentials: Option<UserCredentials>,
}

impl OktaUser {
    fn provider(&self) -> Option<&CredentialProvider> {
        self.credentials.as_ref()?.provider.as_ref()
    }

    /// Credential provider type, `UNKNOWN` when absent.
    #[must_use]
    pub fn provider_type(&self) -> &str {
        self.provider()
            .and_then(|p| p.provider_type.as_deref())
            .unwrap_or("UNKNOWN")
    }

    /// Credential provider name, `UNKNOWN` when absent.
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.provider()
            .and_then(|p| p.name.as_deref())
            .unwrap_or("UNKNOWN")
    }

    /// Profile attribute as a string; `None` when absent, null or blank.
    #[must_use]
    pub fn profile_value(&self, name: &str) -> Option<String> {
        scalar_to_string(self.profile.get(name)?)
    }

    /// Resolves a field path (`id`, `status`, `credentials.provider.type`,
    /// `credentials.provider.name` or `profile.<name>`).
    #[must_use]
    pub fn field(&self, path: &str) -> Option<String> {
        let value = match path {
            "id" => Some(self.id.clone()),
            "status" => self.status.clone(),
            "credentials.provider.type" => self.provider().and_then(|p| p.provider_type.clone()),
            "credentials.provider.name" => self.provider().and_then(|p| p.name.clone()),
            other => return self.profile_value(other.strip_prefix("profile.")?),
        };
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Status derived from the credential provider.
    #[must_use]
    pub fn configuration_status(&self) -> String {
        match self.provider_type() {
            "OKTA" => "Manual (OKTA)".to_string(),
            "FEDERATION" | "IMPORT" => format!("Provisioned ({})", self.provider_name()),
            _ => self.provider_name().to_string(),
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// How a user came to exist in Okta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum UserOrigin {
    /// Assigned to the origin application.
    Imported { app: String },
    /// Created directly in Okta.
    Manual,
}

impl UserOrigin {
    /// Classify a user against the origin app's assigned user ids.
    #[must_use]
    pub fn classify(user_id: &str, app_user_ids: &HashSet<String>, app_label: &str) -> Self {
        if app_user_ids.contains(user_id) {
            UserOrigin::Imported {
                app: app_label.to_string(),
            }
        } else {
            UserOrigin::Manual
        }
    }

    /// Whether the user was imported through the origin app.
    #[must_use]
    pub fn is_imported(&self) -> bool {
        matches!(self, UserOrigin::Imported { .. })
    }
}

impl fmt::Display for UserOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserOrigin::Imported { app } => write!(f, "Imported ({app})"),
            UserOrigin::Manual => write!(f, "Manual (OKTA)"),
        }
    }
}

/// One row of the user origin report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OriginReportRow {
    #[serde(rename = "User ID")]
    pub user_id: String,
    #[serde(rename = "First Name")]
    pub first_name: String,
    #[serde(rename = "Last Name")]
    pub last_name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Origin")]
    pub origin: String,
    #[serde(rename = "Okta Configuration Status")]
    pub configuration_status: String,
}

impl OriginReportRow {
    /// Builds a row; an imported user reports its origin as the status too.
    #[must_use]
    pub fn new(user: &OktaUser, origin: &UserOrigin) -> Self {
        let configuration_status = if origin.is_imported() {
            origin.to_string()
        } else {
            user.configuration_status()
        };
        Self {
            user_id: user.id.clone(),
            first_name: user.profile_value("firstName").unwrap_or_default(),
            last_name: user.profile_value("lastName").unwrap_or_default(),
            email: user.profile_value("email").unwrap_or_default(),
            origin: origin.to_string(),
            configuration_status,
        }
    }
}

impl OktaClient {
    /// Lists all users, following pagination.
    #[instrument(skip(self))]
    pub async fn list_users(&self, filter: Option<&str>) -> OktaResult<Vec<OktaUser>> {
        let limit = self.page_size().to_string();
        let mut query = vec![("limit", limit.as_str())];
        if let Some(filter) = filter {
            query.push(("filter", filter));
        }
        let url = self.endpoint("/api/v1/users", &query)?;

        let users: Vec<OktaUser> = self.get_all(url).await?;
        info!("Fetched {} Okta users", users.len());
        Ok(users)
    }
}
