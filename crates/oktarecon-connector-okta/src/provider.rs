//! `RecordProvider` implementation backed by the Okta API.

use async_trait::async_trait;
use oktarecon_core::{Origin, Record, RecordProvider};
use std::collections::HashSet;
use tracing::{info, instrument, warn};

use crate::client::OktaClient;
use crate::config::OktaConfig;
use crate::users::{OktaUser, OriginReportRow, UserOrigin};
use crate::{OktaError, OktaResult};

/// Users paired with their origin, as used by the origin report.
#[derive(Debug, Clone)]
pub struct OriginReport {
    /// Id of the origin application that was consulted.
    pub app_id: String,
    /// One row per Okta user, in API order.
    pub rows: Vec<OriginReportRow>,
}

impl OriginReport {
    /// Number of users assigned to the origin app.
    #[must_use]
    pub fn imported_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.origin.starts_with("Imported"))
            .count()
    }
}

/// Reads Okta users as reconciliation records.
#[derive(Debug, Clone)]
pub struct OktaProvider {
    client: OktaClient,
    config: OktaConfig,
    display_name: String,
}

impl OktaProvider {
    /// Creates a provider and its HTTP client.
    pub fn new(config: OktaConfig) -> OktaResult<Self> {
        let client = OktaClient::new(&config)?;
        let display_name = format!("Okta ({})", client.base_url().host_str().unwrap_or("tenant"));
        Ok(Self {
            client,
            config,
            display_name,
        })
    }

    /// Returns the underlying client.
    #[must_use]
    pub fn client(&self) -> &OktaClient {
        &self.client
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &OktaConfig {
        &self.config
    }

    /// Maps a user to a record. Returns `None` when the identity field is empty.
    #[must_use]
    pub fn to_record(&self, user: &OktaUser, origin: Option<&UserOrigin>) -> Option<Record> {
        let key = user.field(self.config.identity_field.path())?;
        let mut record = Record::new(key, Origin::Okta);

        for (attribute, path) in &self.config.attribute_map {
            if let Some(value) = user.field(path) {
                record.set_attribute(attribute, value);
            }
        }

        let origin_attribute = self
            .config
            .origin_app
            .as_ref()
            .and_then(|app| app.record_attribute.as_deref());
        if let (Some(attribute), Some(origin)) = (origin_attribute, origin) {
            record.set_attribute(attribute, origin.to_string());
        }

        Some(record)
    }

    /// Resolves the origin app and fetches its assigned user ids.
    async fn origin_app_users(&self) -> OktaResult<Option<(String, String, HashSet<String>)>> {
        let Some(app) = &self.config.origin_app else {
            return Ok(None);
        };
        let app_id = self.client.resolve_app_id(app).await?;
        let ids = self.client.list_app_user_ids(&app_id).await?;
        Ok(Some((app_id, app.display_label().to_string(), ids)))
    }

    /// Fetches users and classifies each against the origin application.
    #[instrument(skip(self))]
    pub async fn origin_report(&self) -> OktaResult<OriginReport> {
        if self.config.origin_app.is_none() {
            return Err(OktaError::Config(
                "origin_app must be configured for the origin report".to_string(),
            ));
        }

        let filter = self.config.user_filter.as_deref();
        let (users, app) = tokio::try_join!(self.client.list_users(filter), self.origin_app_users())?;
        let Some((app_id, label, app_user_ids)) = app else {
            return Err(OktaError::Config("origin_app is not configured".to_string()));
        };

        let rows = users
            .iter()
            .map(|user| {
                let origin = UserOrigin::classify(&user.id, &app_user_ids, &label);
                OriginReportRow::new(user, &origin)
            })
            .collect();

        Ok(OriginReport { app_id, rows })
    }
}

#[async_trait]
impl RecordProvider for OktaProvider {
    type Error = OktaError;

    fn origin(&self) -> Origin {
        Origin::Okta
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    #[instrument(skip(self), fields(tenant = %self.display_name))]
    async fn fetch_records(&self) -> OktaResult<Vec<Record>> {
        let wants_origin = self
            .config
            .origin_app
            .as_ref()
            .is_some_and(|app| app.record_attribute.is_some());

        let filter = self.config.user_filter.as_deref();
        let (users, app) = if wants_origin {
            tokio::try_join!(self.client.list_users(filter), self.origin_app_users())?
        } else {
            (self.client.list_users(filter).await?, None)
        };

        let mut records = Vec::with_capacity(users.len());
        let mut skipped = 0usize;
        for user in &users {
            let origin = app
                .as_ref()
                .map(|(_, label, ids)| UserOrigin::classify(&user.id, ids, label));
            match self.to_record(user, origin.as_ref()) {
                Some(record) => records.push(record),
                None => {
                    skipped += 1;
                    warn!(
                        user_id = %user.id,
                        field = self.config.identity_field.path(),
                        "Skipping Okta user without identity value"
                    );
                }
            }
        }

        info!("Loaded {} Okta records ({} skipped)", records.len(), skipped);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OktaIdentityField, OriginAppConfig};
    use serde_json::json;

    fn provider(identity: OktaIdentityField) -> OktaProvider {
        let config = OktaConfig::builder()
            .domain("acme.okta.com")
            .api_token("00token")
            .identity_field(identity)
            .build()
            .unwrap();
        OktaProvider::new(config).unwrap()
    }

    fn user() -> OktaUser {
        serde_json::from_value(json!({
            "id": "00u1",
            "status": "ACTIVE",
            "profile": {
                "firstName": "Jane",
                "lastName": "Doe",
                "email": "Jane@Example.com",
                "login": "jane"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_display_name_uses_host() {
        let p = provider(OktaIdentityField::Email);
        assert_eq!(p.display_name(), "Okta (acme.okta.com)");
        assert_eq!(p.origin(), Origin::Okta);
    }

    #[test]
    fn test_to_record_default_mapping() {
        let p = provider(OktaIdentityField::Email);
        let record = p.to_record(&user(), None).unwrap();

        assert_eq!(record.identity_key, "Jane@Example.com");
        assert_eq!(record.origin, Origin::Okta);
        assert_eq!(record.attribute("first_name"), Some("Jane"));
        assert_eq!(record.attribute("last_name"), Some("Doe"));
        assert_eq!(record.attribute("status"), Some("ACTIVE"));
        assert_eq!(record.attribute("okta_origin"), None);
    }

    #[test]
    fn test_to_record_other_identity_fields() {
        let by_login = provider(OktaIdentityField::Login);
        assert_eq!(by_login.to_record(&user(), None).unwrap().identity_key, "jane");

        let by_id = provider(OktaIdentityField::Id);
        assert_eq!(by_id.to_record(&user(), None).unwrap().identity_key, "00u1");

        let by_employee = provider(OktaIdentityField::EmployeeNumber);
        assert!(by_employee.to_record(&user(), None).is_none());
    }

    #[test]
    fn test_to_record_with_origin_attribute() {
        let mut config = provider(OktaIdentityField::Email).config().clone();
        config.origin_app = Some(OriginAppConfig {
            app_label: Some("bob".to_string()),
            record_attribute: Some("okta_origin".to_string()),
            ..Default::default()
        });
        let p = OktaProvider::new(config).unwrap();

        let origin = UserOrigin::Imported {
            app: "bob".to_string(),
        };
        let record = p.to_record(&user(), Some(&origin)).unwrap();
        assert_eq!(record.attribute("okta_origin"), Some("Imported (bob)"));
    }
}
