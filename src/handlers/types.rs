//! # Common API Types
//!
//! Response envelopes and the JSON shapes of artists, events and users.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::locale::Locale;
use crate::models::{Image, UserRole, UserStatus, artist, event, user};
use crate::telemetry;

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response metadata
    pub meta: ResponseMeta,
}

/// Response metadata
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResponseMeta {
    /// Trace identifier of the request
    #[schema(example = "5f0c2f61-3c1e-4d6a-9a8e-0d9b1f1c2a77")]
    pub request_id: String,
    /// Response timestamp (ISO 8601)
    #[schema(example = "2025-03-07T20:00:00Z")]
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta {
                request_id: telemetry::current_trace_id()
                    .unwrap_or_else(|| Uuid::new_v4().to_string()),
                timestamp: Utc::now().to_rfc3339(),
            },
        }
    }
}

/// Artist as shown on the public pages
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArtistDto {
    pub id: Uuid,
    #[schema(example = "Orquesta Típica Andariega")]
    pub name: String,
    #[schema(example = "orquesta-tipica-andariega")]
    pub slug: String,
    pub genres: Vec<String>,
    pub bio: String,
    #[schema(example = "Buenos Aires")]
    pub origin: String,
    pub images: Vec<Image>,
    /// Social profile links keyed by network
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_links: Option<serde_json::Value>,
}

impl From<artist::Model> for ArtistDto {
    fn from(artist: artist::Model) -> Self {
        Self {
            genres: artist.genre_tags(),
            images: artist.image_list(),
            id: artist.id,
            name: artist.name,
            slug: artist.slug,
            bio: artist.bio,
            origin: artist.origin,
            social_links: artist.social_links,
        }
    }
}

/// Event with its dates rendered for the requested locale
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventDto {
    pub id: Uuid,
    #[schema(example = "Noche de Milonga")]
    pub title: String,
    pub slug: String,
    /// Calendar dates (`YYYY-MM-DD`) in stored order
    pub dates: Vec<String>,
    /// `dates` rendered as long dates in `locale`
    #[schema(example = json!(["viernes, 7 de marzo de 2025"]))]
    pub formatted_dates: Vec<String>,
    pub locale: Locale,
    pub organizer: String,
    pub artist_id: Uuid,
    pub artist_name: String,
    pub artist_slug: String,
    pub genre: String,
    pub location: String,
    #[schema(example = "21:00")]
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub images: Vec<Image>,
    pub is_deleted: bool,
    /// When the event was soft-deleted (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
}

impl EventDto {
    pub fn from_model(event: event::Model, locale: Locale) -> Self {
        let parsed = event.date_list();
        Self {
            dates: parsed.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect(),
            formatted_dates: parsed.into_iter().map(|d| locale.format_date(d)).collect(),
            locale,
            images: event.image_list(),
            deleted_at: event.deleted_at.map(|at| at.to_rfc3339()),
            id: event.id,
            title: event.title,
            slug: event.slug,
            organizer: event.organizer,
            artist_id: event.artist_id,
            artist_name: event.artist_name,
            artist_slug: event.artist_slug,
            genre: event.genre,
            location: event.location,
            time: event.time,
            price: event.price,
            description: event.description,
            is_deleted: event.is_deleted,
        }
    }

    pub fn list(events: Vec<event::Model>, locale: Locale) -> Vec<Self> {
        events
            .into_iter()
            .map(|event| Self::from_model(event, locale))
            .collect()
    }
}

/// Artist page payload: the artist and its upcoming events
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ArtistEventsDto {
    pub artist: ArtistDto,
    pub events: Vec<EventDto>,
}

/// Outcome of a permanent delete
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurgeResultDto {
    pub id: Uuid,
    #[schema(example = "Event permanently deleted")]
    pub message: String,
    /// Hosted images removed along with the event
    pub images_destroyed: usize,
}

/// Current-user projection
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: Uuid,
    #[schema(example = "user_2abcDEF")]
    pub external_id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
}

impl From<user::Model> for UserDto {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            external_id: user.external_id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            status: user.status,
        }
    }
}
