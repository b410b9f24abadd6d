//! Artist entity model
//!
//! Artists are read-only from the application's point of view. Genre tags,
//! images and social links are stored as JSON columns.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::Value as JsonValue;

use super::{Image, string_list};

/// Artist entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "artists")]
pub struct Model {
    /// Unique identifier for the artist (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// URL slug (unique)
    pub slug: String,

    /// Genre tags, stored as a JSON array of strings
    #[sea_orm(column_type = "JsonBinary")]
    pub genres: JsonValue,

    #[sea_orm(column_type = "Text")]
    pub bio: String,

    /// Where the artist comes from (city / country)
    pub origin: String,

    /// Hosted images, JSON array of `{url, public_id}`
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub images: Option<JsonValue>,

    /// Social links keyed by network name
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub social_links: Option<JsonValue>,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Genre tags as owned strings; malformed entries are skipped.
    pub fn genre_tags(&self) -> Vec<String> {
        string_list(&self.genres)
    }

    pub fn image_list(&self) -> Vec<Image> {
        self.images
            .as_ref()
            .map(Image::list_from_json)
            .unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::event::Entity")]
    Event,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
