//! Origin application lookup and app user membership.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

use crate::client::OktaClient;
use crate::config::OriginAppConfig;
use crate::{OktaError, OktaResult};

/// Application summary from `GET /api/v1/apps`.
#[derive(Debug, Clone, Deserialize)]
pub struct OktaApp {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Picks the app whose label equals `label` (case-insensitive), falling
/// back to the first label containing it.
#[must_use]
pub fn select_app<'a>(apps: &'a [OktaApp], label: &str) -> Option<&'a OktaApp> {
    let wanted = label.trim().to_lowercase();
    apps.iter()
        .find(|app| app.label.to_lowercase() == wanted)
        .or_else(|| {
            apps.iter()
                .find(|app| app.label.to_lowercase().contains(&wanted))
        })
}

/// Extracts the Okta user id from an app user item.
///
/// Tries `_links.user.href` (object or first array element), then
/// `_embedded.user.id`, then an item `id` that looks like a user id.
#[must_use]
pub fn extract_user_id(item: &Value) -> Option<String> {
    let user_link = item.pointer("/_links/user").and_then(|link| match link {
        Value::Array(links) => links.first()?.get("href")?.as_str(),
        other => other.get("href")?.as_str(),
    });
    if let Some(id) = user_link
        .and_then(|href| href.rsplit_once("/users/"))
        .map(|(_, id)| id.trim_end_matches('/'))
        .filter(|id| !id.is_empty())
    {
        return Some(id.to_string());
    }

    if let Some(id) = item
        .pointer("/_embedded/user/id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
    {
        return Some(id.to_string());
    }

    item.get("id")
        .and_then(Value::as_str)
        .filter(|id| id.starts_with("00u"))
        .map(str::to_string)
}

impl OktaClient {
    /// Resolves the origin application id: an explicit id wins, otherwise
    /// the label is searched.
    #[instrument(skip(self, app))]
    pub async fn resolve_app_id(&self, app: &OriginAppConfig) -> OktaResult<String> {
        if let Some(id) = app.app_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            return Ok(id.to_string());
        }

        let label = app
            .app_label
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                OktaError::Config("origin_app requires app_id or app_label".to_string())
            })?;

        let url = self.endpoint("/api/v1/apps", &[("q", label), ("limit", "200")])?;
        let apps: Vec<OktaApp> = self.get_all(url).await?;
        debug!(candidates = apps.len(), "Searched applications by label");

        let selected = select_app(&apps, label).ok_or_else(|| {
            OktaError::AppNotFound(format!(
                "no application labelled '{label}'; set app_id to the exact application ID"
            ))
        })?;
        info!(app_id = %selected.id, label = %selected.label, "Resolved origin application");
        Ok(selected.id.clone())
    }

    /// Collects the ids of all users assigned to an application.
    #[instrument(skip(self))]
    pub async fn list_app_user_ids(&self, app_id: &str) -> OktaResult<HashSet<String>> {
        let limit = self.page_size().to_string();
        let url = self.endpoint(
            &format!("/api/v1/apps/{app_id}/users"),
            &[("limit", limit.as_str())],
        )?;

        let mut ids = HashSet::new();
        self.get_paginated(url, |items: Vec<Value>| {
            ids.extend(items.iter().filter_map(extract_user_id));
            Ok(())
        })
        .await?;

        info!("Found {} users assigned to app {}", ids.len(), app_id);
        Ok(ids)
    }
}
