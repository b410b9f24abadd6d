//! # Tests for Handlers
//!
//! This module contains unit tests for API handlers.

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header::ACCEPT_LANGUAGE},
    response::Json,
};
use sea_orm::{Database, DatabaseConnection};

use crate::config::AppConfig;
use crate::handlers::{healthz, readyz, request_locale, root};
use crate::locale::Locale;
use crate::models::ServiceInfo;
use crate::server::AppState;

fn state_with(db: DatabaseConnection, default_locale: Locale) -> AppState {
    let config = AppConfig {
        profile: "test".to_string(),
        default_locale,
        ..AppConfig::default()
    };
    AppState::from_config(config, db).expect("test state builds")
}

#[tokio::test]
async fn test_root_handler_returns_expected_service_info() {
    let Json(service_info) = root().await;

    assert_eq!(service_info.service, "milonga-api");
    assert_eq!(service_info.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_service_info_serializes_both_fields() {
    let json_value = serde_json::to_value(ServiceInfo::default()).unwrap();

    assert_eq!(json_value["service"], "milonga-api");
    assert!(json_value.get("version").is_some());
}

#[tokio::test]
async fn test_healthz_is_always_ok() {
    let Json(status) = healthz().await;
    assert_eq!(status.status, "ok");
}

#[tokio::test]
async fn test_readyz_reports_ready_with_live_database() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let state = state_with(db, Locale::Es);

    let Json(status) = readyz(State(state)).await.unwrap();
    assert_eq!(status.status, "ready");
}

#[tokio::test]
async fn test_readyz_unavailable_when_pool_closed() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    db.clone().close().await.unwrap();
    let state = state_with(db, Locale::Es);

    let err = readyz(State(state)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(&*err.code, "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn test_request_locale_precedence() {
    let state = state_with(DatabaseConnection::default(), Locale::De);
    let mut headers = HeaderMap::new();

    assert_eq!(request_locale(&state, None, &headers), Locale::De);

    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-GB,en;q=0.9"));
    assert_eq!(request_locale(&state, None, &headers), Locale::En);
    assert_eq!(request_locale(&state, Some("es"), &headers), Locale::Es);
}
