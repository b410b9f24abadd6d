//! # Event Repository
//!
//! SeaORM access to the events table. Public listing queries only see events
//! whose soft-delete flag is clear.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::event::{Column, Entity as Event, Model as EventModel};

/// Repository for Event database operations
pub struct EventRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> EventRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Get an event by ID regardless of its soft-delete state
    pub async fn find_by_id(&self, event_id: Uuid) -> Result<Option<EventModel>, RepositoryError> {
        Event::find_by_id(event_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Get a non-deleted event by ID
    pub async fn find_active_by_id(
        &self,
        event_id: Uuid,
    ) -> Result<Option<EventModel>, RepositoryError> {
        Event::find_by_id(event_id)
            .filter(Column::IsDeleted.eq(false))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Get a non-deleted event by slug
    pub async fn find_active_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<EventModel>, RepositoryError> {
        Event::find()
            .filter(Column::Slug.eq(slug))
            .filter(Column::IsDeleted.eq(false))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// List all non-deleted events
    pub async fn list_active(&self) -> Result<Vec<EventModel>, RepositoryError> {
        Event::find()
            .filter(Column::IsDeleted.eq(false))
            .order_by_asc(Column::Title)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// List non-deleted events of one artist
    pub async fn list_active_for_artist(
        &self,
        artist_id: Uuid,
    ) -> Result<Vec<EventModel>, RepositoryError> {
        Event::find()
            .filter(Column::ArtistId.eq(artist_id))
            .filter(Column::IsDeleted.eq(false))
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// List soft-deleted events, most recently deleted first
    pub async fn list_deleted(&self) -> Result<Vec<EventModel>, RepositoryError> {
        Event::find()
            .filter(Column::IsDeleted.eq(true))
            .order_by_desc(Column::DeletedAt)
            .order_by_asc(Column::Title)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Flip the soft-delete flag. Only the flag and its timestamp are written.
    pub async fn set_deleted(
        &self,
        event: EventModel,
        deleted: bool,
    ) -> Result<EventModel, RepositoryError> {
        let mut active_event = event.into_active_model();
        active_event.is_deleted = Set(deleted);
        active_event.deleted_at = Set(deleted.then(|| Utc::now().into()));

        active_event
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Remove the row permanently
    pub async fn remove(&self, event: EventModel) -> Result<(), RepositoryError> {
        let result = event
            .delete(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound("Event not found".to_string()));
        }

        Ok(())
    }
}
