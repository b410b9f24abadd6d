//! # Artist API Handlers
//!
//! Public, unauthenticated artist listings.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Json,
};

use crate::error::{ApiError, RepositoryError, not_found};
use crate::filter::FilterCriteria;
use crate::handlers::request_locale;
use crate::handlers::types::{ApiResponse, ArtistDto, ArtistEventsDto, EventDto};
use crate::listing::ListingService;
use crate::locale::LangQuery;
use crate::server::AppState;

fn artist_error(slug: &str, err: RepositoryError) -> ApiError {
    match err {
        RepositoryError::NotFound(_) => not_found("ARTIST_NOT_FOUND", "Artist not found")
            .with_details(serde_json::json!({ "slug": slug })),
        other => other.into(),
    }
}

/// List artists, optionally narrowed by name and genre
#[utoipa::path(
    get,
    path = "/api/artists",
    params(FilterCriteria),
    responses(
        (status = 200, description = "Artists sorted by name", body = ApiResponse<Vec<ArtistDto>>),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "artists"
)]
pub async fn list_artists(
    State(state): State<AppState>,
    Query(criteria): Query<FilterCriteria>,
) -> Result<Json<ApiResponse<Vec<ArtistDto>>>, ApiError> {
    let artists = ListingService::new(&state.db)
        .list_artists(&criteria)
        .await?;

    Ok(Json(ApiResponse::new(
        artists.into_iter().map(ArtistDto::from).collect(),
    )))
}

/// Get one artist by slug
#[utoipa::path(
    get,
    path = "/api/artists/{slug}",
    params(
        ("slug" = String, Path, description = "Artist slug")
    ),
    responses(
        (status = 200, description = "Artist found", body = ApiResponse<ArtistDto>),
        (status = 404, description = "Artist not found", body = ApiError)
    ),
    tag = "artists"
)]
pub async fn get_artist(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<ArtistDto>>, ApiError> {
    let artist = ListingService::new(&state.db)
        .artist_by_slug(&slug)
        .await
        .map_err(|err| artist_error(&slug, err))?;

    Ok(Json(ApiResponse::new(artist.into())))
}

/// Upcoming events of one artist, earliest first
#[utoipa::path(
    get,
    path = "/api/artists/{slug}/events",
    params(
        ("slug" = String, Path, description = "Artist slug"),
        LangQuery
    ),
    responses(
        (status = 200, description = "Artist with its active events", body = ApiResponse<ArtistEventsDto>),
        (status = 404, description = "Artist not found", body = ApiError)
    ),
    tag = "artists"
)]
pub async fn list_artist_events(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<LangQuery>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<ArtistEventsDto>>, ApiError> {
    let locale = request_locale(&state, query.lang.as_deref(), &headers);
    let (artist, events) = ListingService::new(&state.db)
        .events_for_artist(&slug)
        .await
        .map_err(|err| artist_error(&slug, err))?;

    Ok(Json(ApiResponse::new(ArtistEventsDto {
        artist: artist.into(),
        events: EventDto::list(events, locale),
    })))
}
