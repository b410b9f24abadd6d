//! # Event API Handlers
//!
//! Public event listings plus the soft-delete administration endpoints.
//! Administration endpoints check the caller before touching the event, so an
//! unauthorised caller never learns whether an id exists.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::auth::AuthState;
use crate::error::{ApiError, RepositoryError, not_found, validation_error};
use crate::filter::FilterCriteria;
use crate::handlers::request_locale;
use crate::handlers::types::{ApiResponse, EventDto, PurgeResultDto};
use crate::images;
use crate::lifecycle::EventLifecycle;
use crate::listing::{EventKey, ListingService};
use crate::locale::LangQuery;
use crate::server::AppState;

/// Query parameters for the event listing
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventListQuery {
    /// Case-insensitive substring of the event title
    pub name: Option<String>,
    /// Genre the event must belong to
    pub genre: Option<String>,
    /// Presentation locale (`es`, `en` or `de`)
    pub lang: Option<String>,
}

fn parse_event_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        validation_error(
            "Invalid event id",
            json!({ "id": "Must be a valid UUID" }),
        )
    })
}

fn event_error(err: RepositoryError) -> ApiError {
    match err {
        RepositoryError::NotFound(_) => not_found("EVENT_NOT_FOUND", "Event not found"),
        other => other.into(),
    }
}

/// List active events, optionally narrowed by title and genre
#[utoipa::path(
    get,
    path = "/api/events",
    params(EventListQuery),
    responses(
        (status = 200, description = "Active events sorted by title", body = ApiResponse<Vec<EventDto>>),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "events"
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventListQuery>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<EventDto>>>, ApiError> {
    let locale = request_locale(&state, query.lang.as_deref(), &headers);
    let criteria = FilterCriteria {
        name: query.name,
        genre: query.genre,
    };

    let events = ListingService::new(&state.db).list_events(&criteria).await?;

    Ok(Json(ApiResponse::new(EventDto::list(events, locale))))
}

/// Get an active event by id or slug
#[utoipa::path(
    get,
    path = "/api/events/{id}",
    params(
        ("id" = String, Path, description = "Event UUID or slug"),
        LangQuery
    ),
    responses(
        (status = 200, description = "Event found", body = ApiResponse<EventDto>),
        (status = 404, description = "Event not found or deleted", body = ApiError)
    ),
    tag = "events"
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<LangQuery>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<EventDto>>, ApiError> {
    let locale = request_locale(&state, query.lang.as_deref(), &headers);
    let event = ListingService::new(&state.db)
        .event_by_key(&EventKey::parse(&key))
        .await
        .map_err(event_error)?;

    Ok(Json(ApiResponse::new(EventDto::from_model(event, locale))))
}

/// List soft-deleted events (administrators only)
#[utoipa::path(
    get,
    path = "/api/events/deleted",
    security(("bearer_auth" = [])),
    params(LangQuery),
    responses(
        (status = 200, description = "Soft-deleted events, most recent first", body = ApiResponse<Vec<EventDto>>),
        (status = 401, description = "Not signed in", body = ApiError),
        (status = 403, description = "Not an active administrator", body = ApiError)
    ),
    tag = "events"
)]
pub async fn list_deleted_events(
    State(state): State<AppState>,
    auth: AuthState,
    Query(query): Query<LangQuery>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<EventDto>>>, ApiError> {
    auth.require_admin()?;

    let locale = request_locale(&state, query.lang.as_deref(), &headers);
    let events = ListingService::new(&state.db).list_deleted_events().await?;

    Ok(Json(ApiResponse::new(EventDto::list(events, locale))))
}

/// Soft-delete an event
#[utoipa::path(
    delete,
    path = "/api/events/{id}/delete",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Event UUID"),
        LangQuery
    ),
    responses(
        (status = 200, description = "Event soft-deleted", body = ApiResponse<EventDto>),
        (status = 400, description = "Event already deleted or id malformed", body = ApiError),
        (status = 401, description = "Not signed in", body = ApiError),
        (status = 403, description = "Account not active", body = ApiError),
        (status = 404, description = "Event not found", body = ApiError)
    ),
    tag = "events"
)]
pub async fn soft_delete_event(
    State(state): State<AppState>,
    auth: AuthState,
    Path(raw_id): Path<String>,
    Query(query): Query<LangQuery>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<EventDto>>, ApiError> {
    let user = auth.require_active()?;
    let event_id = parse_event_id(&raw_id)?;

    let event = EventLifecycle::new(&state.db).delete(event_id).await?;
    tracing::info!(%event_id, user_id = %user.id, "Event soft-deleted");

    let locale = request_locale(&state, query.lang.as_deref(), &headers);
    Ok(Json(ApiResponse::new(EventDto::from_model(event, locale))))
}

/// Restore a soft-deleted event
#[utoipa::path(
    post,
    path = "/api/events/{id}/restore",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Event UUID"),
        LangQuery
    ),
    responses(
        (status = 200, description = "Event restored", body = ApiResponse<EventDto>),
        (status = 400, description = "Event is not deleted or id malformed", body = ApiError),
        (status = 401, description = "Not signed in", body = ApiError),
        (status = 403, description = "Account not active", body = ApiError),
        (status = 404, description = "Event not found", body = ApiError)
    ),
    tag = "events"
)]
pub async fn restore_event(
    State(state): State<AppState>,
    auth: AuthState,
    Path(raw_id): Path<String>,
    Query(query): Query<LangQuery>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<EventDto>>, ApiError> {
    let user = auth.require_active()?;
    let event_id = parse_event_id(&raw_id)?;

    let event = EventLifecycle::new(&state.db).restore(event_id).await?;
    tracing::info!(%event_id, user_id = %user.id, "Event restored");

    let locale = request_locale(&state, query.lang.as_deref(), &headers);
    Ok(Json(ApiResponse::new(EventDto::from_model(event, locale))))
}

/// Permanently delete an event and its hosted images (administrators only)
#[utoipa::path(
    delete,
    path = "/api/events/{id}/permanently-delete",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Event UUID")
    ),
    responses(
        (status = 200, description = "Event removed", body = ApiResponse<PurgeResultDto>),
        (status = 400, description = "Malformed id", body = ApiError),
        (status = 401, description = "Not signed in", body = ApiError),
        (status = 403, description = "Not an active administrator", body = ApiError),
        (status = 404, description = "Event not found", body = ApiError)
    ),
    tag = "events"
)]
pub async fn permanently_delete_event(
    State(state): State<AppState>,
    auth: AuthState,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<PurgeResultDto>>, ApiError> {
    let admin = auth.require_admin()?;
    let event_id = parse_event_id(&raw_id)?;

    let purged = EventLifecycle::new(&state.db)
        .permanently_delete(event_id)
        .await?;
    tracing::warn!(%event_id, admin_id = %admin.id, "Event permanently deleted");

    let images_destroyed = images::destroy_all(state.images.as_ref(), &purged.image_list()).await;

    Ok(Json(ApiResponse::new(PurgeResultDto {
        id: event_id,
        message: "Event permanently deleted".to_string(),
        images_destroyed,
    })))
}
