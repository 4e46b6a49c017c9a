//! Common test utilities for oktarecon-connector-okta integration tests.

#![cfg(feature = "integration")]
#![allow(dead_code)]

use oktarecon_connector_okta::{OktaConfig, RateLimitConfig};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test data factory for creating Okta users.
pub fn create_test_user(id: &str, email_prefix: &str) -> Value {
    json!({
        "id": id,
        "status": "ACTIVE",
        "created": "2024-01-15T10:00:00.000Z",
        "lastLogin": null,
        "profile": {
            "firstName": "Test",
            "lastName": format!("User {}", email_prefix),
            "email": format!("{}@example.com", email_prefix),
            "login": format!("{}@example.com", email_prefix)
        },
        "credentials": {
            "provider": {"type": "OKTA", "name": "OKTA"}
        }
    })
}

/// Test data factory for a user without an email in its profile.
pub fn create_user_without_email(id: &str) -> Value {
    json!({
        "id": id,
        "status": "STAGED",
        "profile": {"firstName": "No", "lastName": "Email", "login": format!("{id}@login")}
    })
}

/// Test data factory for an app user assignment.
pub fn create_app_user(server_uri: &str, user_id: &str) -> Value {
    json!({
        "id": format!("0ua-{user_id}"),
        "scope": "USER",
        "_links": {
            "user": {"href": format!("{server_uri}/api/v1/users/{user_id}")}
        }
    })
}

/// Test data factory for an application.
pub fn create_app(id: &str, label: &str) -> Value {
    json!({"id": id, "label": label, "status": "ACTIVE"})
}

/// Creates an Okta error body.
pub fn create_okta_error(code: &str, summary: &str) -> Value {
    json!({
        "errorCode": code,
        "errorSummary": summary,
        "errorLink": code,
        "errorId": "oaeTest",
        "errorCauses": []
    })
}

/// Formats a `Link` header pointing to the next page.
pub fn next_link(url: &str) -> String {
    format!(r#"<{url}>; rel="next""#)
}

/// Configuration pointing at a mock server with short retry delays.
pub fn test_config(server: &MockServer) -> OktaConfig {
    OktaConfig::builder()
        .domain(server.uri())
        .api_token("test-token")
        .page_size(2)
        .rate_limit(RateLimitConfig::for_testing())
        .build()
        .expect("test config should be valid")
}

/// Mounts `/api/v1/users` returning `users` in pages of `page_size`,
/// chained with `Link` headers using `after` cursors.
pub async fn mock_users_endpoint(server: &MockServer, users: &[Value], page_size: usize) {
    let pages: Vec<Vec<Value>> = users.chunks(page_size).map(<[Value]>::to_vec).collect();
    let total_pages = pages.len();

    // Cursor pages first so they take precedence over the bare path match.
    for (i, page) in pages.iter().enumerate().skip(1) {
        let mut template = ResponseTemplate::new(200).set_body_json(page);
        if i < total_pages - 1 {
            template = template.insert_header(
                "link",
                next_link(&format!("{}/api/v1/users?after=page{}", server.uri(), i + 1)),
            );
        }
        Mock::given(method("GET"))
            .and(path("/api/v1/users"))
            .and(query_param("after", format!("page{i}")))
            .respond_with(template)
            .mount(server)
            .await;
    }

    let first = pages.first().cloned().unwrap_or_default();
    let mut template = ResponseTemplate::new(200).set_body_json(first);
    if total_pages > 1 {
        template = template.insert_header(
            "link",
            next_link(&format!("{}/api/v1/users?after=page1", server.uri())),
        );
    }
    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .respond_with(template)
        .mount(server)
        .await;
}

/// Mounts the app search endpoint.
pub async fn mock_apps_search(server: &MockServer, label: &str, apps: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/api/v1/apps"))
        .and(query_param("q", label))
        .respond_with(ResponseTemplate::new(200).set_body_json(apps))
        .mount(server)
        .await;
}

/// Mounts the app users endpoint as a single page.
pub async fn mock_app_users(server: &MockServer, app_id: &str, user_ids: &[&str]) {
    let items: Vec<Value> = user_ids
        .iter()
        .map(|id| create_app_user(&server.uri(), id))
        .collect();
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/apps/{app_id}/users")))
        .respond_with(ResponseTemplate::new(200).set_body_json(items))
        .mount(server)
        .await;
}
