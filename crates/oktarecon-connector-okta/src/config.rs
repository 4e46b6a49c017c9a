//! Okta connector configuration.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::BTreeMap;
use url::Url;

use crate::rate_limit::RateLimitConfig;
use crate::{OktaError, OktaResult};

/// Largest page size the Okta users endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Okta user field used as the identity key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OktaIdentityField {
    /// `profile.email`
    #[default]
    Email,
    /// `profile.login`
    Login,
    /// Okta user id (`00u...`)
    Id,
    /// `profile.employeeNumber`
    EmployeeNumber,
}

impl OktaIdentityField {
    /// Field path understood by [`OktaUser::field`](crate::OktaUser::field).
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            OktaIdentityField::Email => "profile.email",
            OktaIdentityField::Login => "profile.login",
            OktaIdentityField::Id => "id",
            OktaIdentityField::EmployeeNumber => "profile.employeeNumber",
        }
    }
}

/// Application whose assigned users count as imported rather than manual.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OriginAppConfig {
    /// Exact application id. Takes precedence over the label.
    #[serde(default)]
    pub app_id: Option<String>,
    /// Application label to search for (e.g. "HiBob").
    #[serde(default)]
    pub app_label: Option<String>,
    /// When set, Okta records carry their origin under this attribute name.
    #[serde(default)]
    pub record_attribute: Option<String>,
}

impl OriginAppConfig {
    /// Label used in origin strings, falling back to the id.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.app_label
            .as_deref()
            .or(self.app_id.as_deref())
            .unwrap_or("app")
    }

    /// Validates that the app can be identified.
    pub fn validate(&self) -> OktaResult<()> {
        let has_id = self.app_id.as_deref().is_some_and(|s| !s.trim().is_empty());
        let has_label = self
            .app_label
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());
        if !has_id && !has_label {
            return Err(OktaError::Config(
                "origin_app requires app_id or app_label".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

fn default_timeout_secs() -> u64 {
    30
}

/// Default mapping from record attribute to Okta field path.
#[must_use]
pub fn default_attribute_map() -> BTreeMap<String, String> {
    [
        ("first_name", "profile.firstName"),
        ("last_name", "profile.lastName"),
        ("email", "profile.email"),
        ("status", "status"),
    ]
    .into_iter()
    .map(|(attr, path)| (attr.to_string(), path.to_string()))
    .collect()
}

/// Okta tenant connection and mapping settings.
#[derive(Debug, Clone, Deserialize)]
pub struct OktaConfig {
    /// Okta domain, with or without scheme (e.g. `acme.okta.com`).
    #[serde(default)]
    pub domain: String,
    /// API token, sent as `SSWS <token>`.
    #[serde(default)]
    pub api_token: Option<SecretString>,
    /// Users per page (1..=200).
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Okta filter expression for the users endpoint (e.g. `status eq "ACTIVE"`).
    #[serde(default)]
    pub user_filter: Option<String>,
    /// Field used as the identity key.
    #[serde(default)]
    pub identity_field: OktaIdentityField,
    /// Record attribute name to Okta field path.
    #[serde(default = "default_attribute_map", alias = "attributes")]
    pub attribute_map: BTreeMap<String, String>,
    /// Application used to classify users as imported.
    #[serde(default)]
    pub origin_app: Option<OriginAppConfig>,
    /// 429 handling.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Default for OktaConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            api_token: None,
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
            user_filter: None,
            identity_field: OktaIdentityField::default(),
            attribute_map: default_attribute_map(),
            origin_app: None,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl OktaConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> OktaConfigBuilder {
        OktaConfigBuilder::default()
    }

    /// Domain with scheme added and trailing slashes removed.
    #[must_use]
    pub fn normalized_domain(&self) -> String {
        normalize_domain(&self.domain)
    }

    /// Base URL of the tenant.
    pub fn base_url(&self) -> OktaResult<Url> {
        let domain = self.normalized_domain();
        if domain.is_empty() {
            return Err(OktaError::Config("domain is required".to_string()));
        }
        Ok(Url::parse(&domain)?)
    }

    /// Token value, if configured and non-empty.
    pub fn token(&self) -> OktaResult<&str> {
        self.api_token
            .as_ref()
            .map(|t| t.expose_secret().as_str())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| OktaError::Config("api_token is required".to_string()))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> OktaResult<()> {
        self.base_url()?;
        self.token()?;

        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(OktaError::Config(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(OktaError::Config("timeout_secs must be > 0".to_string()));
        }
        for (attribute, path) in &self.attribute_map {
            if !is_supported_path(path) {
                return Err(OktaError::Config(format!(
                    "attribute '{attribute}' maps to unsupported Okta field '{path}'"
                )));
            }
        }
        if let Some(app) = &self.origin_app {
            app.validate()?;
        }
        self.rate_limit.validate().map_err(OktaError::Config)?;
        Ok(())
    }
}

/// Add `https://` when no scheme is present and strip trailing slashes.
#[must_use]
pub fn normalize_domain(domain: &str) -> String {
    let trimmed = domain.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

fn is_supported_path(path: &str) -> bool {
    matches!(
        path,
        "id" | "status" | "credentials.provider.type" | "credentials.provider.name"
    ) || path
        .strip_prefix("profile.")
        .is_some_and(|name| !name.is_empty())
}

/// Builder for [`OktaConfig`].
#[derive(Debug, Default)]
pub struct OktaConfigBuilder {
    domain: Option<String>,
    api_token: Option<SecretString>,
    page_size: Option<u32>,
    timeout_secs: Option<u64>,
    user_filter: Option<String>,
    identity_field: Option<OktaIdentityField>,
    attribute_map: Option<BTreeMap<String, String>>,
    origin_app: Option<OriginAppConfig>,
    rate_limit: Option<RateLimitConfig>,
}

impl OktaConfigBuilder {
    /// Sets the Okta domain.
    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Sets the API token.
    #[must_use]
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(SecretString::new(token.into()));
        self
    }

    /// Sets the page size.
    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Sets the users filter expression.
    #[must_use]
    pub fn user_filter(mut self, filter: impl Into<String>) -> Self {
        self.user_filter = Some(filter.into());
        self
    }

    /// Sets the identity field.
    #[must_use]
    pub fn identity_field(mut self, field: OktaIdentityField) -> Self {
        self.identity_field = Some(field);
        self
    }

    /// Replaces the attribute map.
    #[must_use]
    pub fn attribute_map(mut self, map: BTreeMap<String, String>) -> Self {
        self.attribute_map = Some(map);
        self
    }

    /// Identifies the origin app by label.
    #[must_use]
    pub fn origin_app_label(mut self, label: impl Into<String>) -> Self {
        self.origin_app.get_or_insert_with(Default::default).app_label = Some(label.into());
        self
    }

    /// Identifies the origin app by id.
    #[must_use]
    pub fn origin_app_id(mut self, id: impl Into<String>) -> Self {
        self.origin_app.get_or_insert_with(Default::default).app_id = Some(id.into());
        self
    }

    /// Sets the rate limit configuration.
    #[must_use]
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = Some(config);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> OktaResult<OktaConfig> {
        let config = OktaConfig {
            domain: self.domain.unwrap_or_default(),
            api_token: self.api_token,
            page_size: self.page_size.unwrap_or_else(default_page_size),
            timeout_secs: self.timeout_secs.unwrap_or_else(default_timeout_secs),
            user_filter: self.user_filter,
            identity_field: self.identity_field.unwrap_or_default(),
            attribute_map: self.attribute_map.unwrap_or_else(default_attribute_map),
            origin_app: self.origin_app,
            rate_limit: self.rate_limit.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}
