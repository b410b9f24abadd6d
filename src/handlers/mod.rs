//! # API Handlers
//!
//! This module contains all the HTTP endpoint handlers for the Milonga API.

pub mod artists;
pub mod events;
pub mod types;
pub mod users;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header::ACCEPT_LANGUAGE},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db;
use crate::error::ApiError;
use crate::locale::Locale;
use crate::models::ServiceInfo;
use crate::server::AppState;

/// Liveness / readiness payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    #[schema(example = "ok")]
    pub status: String,
}

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Process is up", body = HealthStatus)
    ),
    tag = "root"
)]
pub async fn healthz() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
    })
}

/// Readiness probe; checks the database
#[utoipa::path(
    get,
    path = "/readyz",
    responses(
        (status = 200, description = "Ready to serve traffic", body = HealthStatus),
        (status = 503, description = "Database unreachable", body = ApiError)
    ),
    tag = "root"
)]
pub async fn readyz(State(state): State<AppState>) -> Result<Json<HealthStatus>, ApiError> {
    db::health_check(&state.db).await.map_err(|err| {
        tracing::warn!(error = %err, "Readiness check failed");
        ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            "Database is not reachable",
        )
    })?;

    Ok(Json(HealthStatus {
        status: "ready".to_string(),
    }))
}

/// Locale for the response: `?lang=`, then `Accept-Language`, then the configured default.
pub(crate) fn request_locale(state: &AppState, lang: Option<&str>, headers: &HeaderMap) -> Locale {
    let accept_language = headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok());
    Locale::resolve(lang, accept_language, state.config.default_locale)
}

#[cfg(test)]
mod tests;
