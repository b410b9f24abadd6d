//! # Artist Repository
//!
//! Read-only access to the artists table.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use crate::error::RepositoryError;
use crate::models::artist::{Column, Entity as Artist, Model as ArtistModel};

/// Repository for Artist database operations
pub struct ArtistRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ArtistRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// List all artists
    pub async fn list_all(&self) -> Result<Vec<ArtistModel>, RepositoryError> {
        Artist::find()
            .order_by_asc(Column::Name)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Get an artist by slug
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<ArtistModel>, RepositoryError> {
        Artist::find()
            .filter(Column::Slug.eq(slug))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
