//! # User API Handlers
//!
//! The current-user projection and the identity-provider sync.

use axum::{extract::State, http::StatusCode, response::Json};
use metrics::counter;
use serde_json::json;

use crate::auth::AuthState;
use crate::error::{ApiError, validation_error};
use crate::handlers::types::{ApiResponse, UserDto};
use crate::repositories::{NewUser, SyncOutcome, UserRepository};
use crate::server::AppState;

/// Current user's status and role
#[utoipa::path(
    get,
    path = "/api/user",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Registered user", body = ApiResponse<UserDto>),
        (status = 401, description = "Not signed in", body = ApiError),
        (status = 404, description = "Signed in but not registered", body = ApiError)
    ),
    tag = "users"
)]
pub async fn current_user(auth: AuthState) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = auth.require_registered()?;
    Ok(Json(ApiResponse::new(user.into())))
}

/// Create the internal user for the signed-in identity, if missing
#[utoipa::path(
    post,
    path = "/api/sync-user",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "User created with PENDING status", body = ApiResponse<UserDto>),
        (status = 200, description = "User already existed", body = ApiResponse<UserDto>),
        (status = 400, description = "Session lacks a usable email", body = ApiError),
        (status = 401, description = "Not signed in", body = ApiError)
    ),
    tag = "users"
)]
pub async fn sync_user(
    State(state): State<AppState>,
    auth: AuthState,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    if let AuthState::Registered { user, .. } = &auth {
        counter!("user_sync_total", "outcome" => "existing").increment(1);
        return Ok((StatusCode::OK, Json(ApiResponse::new(user.clone().into()))));
    }

    let session = auth.require_session()?;
    let claims = session.claims;
    let Some(email) = claims.email.filter(|email| !email.trim().is_empty()) else {
        counter!("user_sync_total", "outcome" => "rejected").increment(1);
        return Err(validation_error(
            "Session has no email address",
            json!({ "email": "Identity provider did not supply an email" }),
        ));
    };

    let outcome = UserRepository::new(&state.db)
        .get_or_create(NewUser {
            external_id: claims.sub,
            email,
            first_name: claims.given_name,
            last_name: claims.family_name,
        })
        .await
        .inspect_err(|_| {
            counter!("user_sync_total", "outcome" => "rejected").increment(1);
        })?;

    let (status, label) = match &outcome {
        SyncOutcome::Created(_) => (StatusCode::CREATED, "created"),
        SyncOutcome::Existing(_) => (StatusCode::OK, "existing"),
    };
    counter!("user_sync_total", "outcome" => label).increment(1);

    let user = outcome.into_user();
    tracing::info!(user_id = %user.id, external_id = %user.external_id, outcome = label, "User synced");

    Ok((status, Json(ApiResponse::new(user.into()))))
}
