//! # Listing Service
//!
//! Read-only artist and event collections for the public pages. Soft-deleted
//! events never appear here except through [`ListingService::list_deleted_events`].

use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::filter::{FilterCriteria, filter_and_sort};
use crate::models::{artist, event};
use crate::repositories::{ArtistRepository, EventRepository};

/// Lookup key for a single event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKey {
    Id(Uuid),
    Slug(String),
}

impl EventKey {
    /// Path segments that parse as a UUID are ids; anything else is a slug.
    pub fn parse(raw: &str) -> Self {
        match Uuid::parse_str(raw) {
            Ok(id) => EventKey::Id(id),
            Err(_) => EventKey::Slug(raw.to_string()),
        }
    }
}

pub struct ListingService<'a> {
    artists: ArtistRepository<'a>,
    events: EventRepository<'a>,
}

impl<'a> ListingService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self {
            artists: ArtistRepository::new(db),
            events: EventRepository::new(db),
        }
    }

    pub async fn list_artists(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<artist::Model>, RepositoryError> {
        let artists = self.artists.list_all().await?;
        Ok(filter_and_sort(&artists, criteria))
    }

    pub async fn artist_by_slug(&self, slug: &str) -> Result<artist::Model, RepositoryError> {
        self.artists
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Artist '{slug}' not found")))
    }

    pub async fn list_events(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<event::Model>, RepositoryError> {
        let events = self.events.list_active().await?;
        Ok(filter_and_sort(&events, criteria))
    }

    pub async fn event_by_key(&self, key: &EventKey) -> Result<event::Model, RepositoryError> {
        let found = match key {
            EventKey::Id(id) => self.events.find_active_by_id(*id).await?,
            EventKey::Slug(slug) => self.events.find_active_by_slug(slug).await?,
        };
        found.ok_or_else(|| RepositoryError::NotFound("Event not found".to_string()))
    }

    /// Active events of the artist, earliest first date first. Events without
    /// any parseable date go last.
    pub async fn events_for_artist(
        &self,
        slug: &str,
    ) -> Result<(artist::Model, Vec<event::Model>), RepositoryError> {
        let artist = self.artist_by_slug(slug).await?;
        let mut events = self.events.list_active_for_artist(artist.id).await?;
        sort_by_first_date(&mut events);
        Ok((artist, events))
    }

    pub async fn list_deleted_events(&self) -> Result<Vec<event::Model>, RepositoryError> {
        self.events.list_deleted().await
    }
}

fn sort_by_first_date(events: &mut [event::Model]) {
    events.sort_by_cached_key(|event| {
        let first = event.date_list().into_iter().min();
        (first.is_none(), first, event.title.clone())
    });
}
