//! Integration tests for origin app resolution and the record provider.

#![cfg(feature = "integration")]

mod common;

use common::*;
use oktarecon_connector_okta::{OktaClient, OktaError, OktaProvider, OriginAppConfig};
use oktarecon_core::{Origin, RecordProvider};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn origin_app(label: &str, record_attribute: Option<&str>) -> OriginAppConfig {
    OriginAppConfig {
        app_label: Some(label.to_string()),
        record_attribute: record_attribute.map(str::to_string),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_resolve_app_id_prefers_exact_label() {
    let server = MockServer::start().await;
    mock_apps_search(
        &server,
        "HiBob",
        vec![create_app("0oa1", "HiBob Sandbox"), create_app("0oa2", "hibob")],
    )
    .await;

    let client = OktaClient::new(&test_config(&server)).unwrap();
    let id = client.resolve_app_id(&origin_app("HiBob", None)).await.unwrap();
    assert_eq!(id, "0oa2");
}

#[tokio::test]
async fn test_resolve_app_id_explicit_id_skips_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/apps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let client = OktaClient::new(&test_config(&server)).unwrap();
    let app = OriginAppConfig {
        app_id: Some("0oaExplicit".to_string()),
        ..Default::default()
    };
    assert_eq!(client.resolve_app_id(&app).await.unwrap(), "0oaExplicit");
}

#[tokio::test]
async fn test_resolve_app_id_not_found() {
    let server = MockServer::start().await;
    mock_apps_search(&server, "HiBob", vec![create_app("0oa1", "Slack")]).await;

    let client = OktaClient::new(&test_config(&server)).unwrap();
    let err = client
        .resolve_app_id(&origin_app("HiBob", None))
        .await
        .unwrap_err();
    assert!(matches!(err, OktaError::AppNotFound(_)));
}

#[tokio::test]
async fn test_list_app_user_ids() {
    let server = MockServer::start().await;
    mock_app_users(&server, "0oa2", &["00u1", "00u3"]).await;

    let client = OktaClient::new(&test_config(&server)).unwrap();
    let ids = client.list_app_user_ids("0oa2").await.unwrap();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains("00u1"));
    assert!(ids.contains("00u3"));
}

#[tokio::test]
async fn test_fetch_records_skips_users_without_identity() {
    let server = MockServer::start().await;
    let users = vec![
        create_test_user("00u1", "jane"),
        create_user_without_email("00u2"),
        create_test_user("00u3", "john"),
    ];
    mock_users_endpoint(&server, &users, 2).await;

    let provider = OktaProvider::new(test_config(&server)).unwrap();
    let records = provider.fetch_records().await.unwrap();

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.origin == Origin::Okta));
    assert_eq!(records[0].identity_key, "jane@example.com");
    assert_eq!(records[0].attribute("first_name"), Some("Test"));
    assert_eq!(records[1].identity_key, "john@example.com");
}

#[tokio::test]
async fn test_fetch_records_with_origin_attribute() {
    let server = MockServer::start().await;
    let users = vec![create_test_user("00u1", "jane"), create_test_user("00u2", "john")];
    mock_users_endpoint(&server, &users, 2).await;
    mock_apps_search(&server, "bob", vec![create_app("0oaBob", "bob")]).await;
    mock_app_users(&server, "0oaBob", &["00u2"]).await;

    let mut config = test_config(&server);
    config.origin_app = Some(origin_app("bob", Some("okta_origin")));
    let provider = OktaProvider::new(config).unwrap();
    let records = provider.fetch_records().await.unwrap();

    assert_eq!(records[0].attribute("okta_origin"), Some("Manual (OKTA)"));
    assert_eq!(records[1].attribute("okta_origin"), Some("Imported (bob)"));
}

#[tokio::test]
async fn test_origin_report_rows() {
    let server = MockServer::start().await;
    let users = vec![create_test_user("00u1", "jane"), create_test_user("00u2", "john")];
    mock_users_endpoint(&server, &users, 2).await;
    mock_apps_search(&server, "bob", vec![create_app("0oaBob", "bob")]).await;
    mock_app_users(&server, "0oaBob", &["00u1"]).await;

    let mut config = test_config(&server);
    config.origin_app = Some(origin_app("bob", None));
    let provider = OktaProvider::new(config).unwrap();
    let report = provider.origin_report().await.unwrap();

    assert_eq!(report.app_id, "0oaBob");
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.imported_count(), 1);
    assert_eq!(report.rows[0].origin, "Imported (bob)");
    assert_eq!(report.rows[0].configuration_status, "Imported (bob)");
    assert_eq!(report.rows[1].origin, "Manual (OKTA)");
    assert_eq!(report.rows[1].email, "john@example.com");
}

#[tokio::test]
async fn test_origin_report_requires_origin_app() {
    let server = MockServer::start().await;
    let provider = OktaProvider::new(test_config(&server)).unwrap();
    assert!(matches!(
        provider.origin_report().await,
        Err(OktaError::Config(_))
    ));
}
