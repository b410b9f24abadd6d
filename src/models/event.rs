//! Event entity model
//!
//! Events belong to one artist and carry the `is_deleted` flag driving the
//! soft-delete lifecycle (see [`crate::lifecycle`]).

use chrono::NaiveDate;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::Value as JsonValue;

use super::{Image, string_list};

/// Event entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    /// Unique identifier for the event (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub title: String,

    /// URL slug (unique)
    pub slug: String,

    /// Ordered list of ISO-8601 calendar dates (`YYYY-MM-DD`)
    #[sea_orm(column_type = "JsonBinary")]
    pub dates: JsonValue,

    pub organizer: String,

    /// Referenced artist
    pub artist_id: Uuid,

    /// Denormalized artist name for listings
    pub artist_name: String,

    /// Denormalized artist slug for links
    pub artist_slug: String,

    pub genre: String,

    pub location: String,

    /// Start time as displayed (e.g. `21:00`)
    pub time: String,

    pub price: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Hosted images, JSON array of `{url, public_id}`
    #[sea_orm(column_type = "JsonBinary")]
    pub images: JsonValue,

    /// Soft-delete flag
    pub is_deleted: bool,

    /// When the event was last soft-deleted; cleared on restore
    pub deleted_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Parsed event dates in stored order. Entries that are not valid
    /// `YYYY-MM-DD` strings are skipped.
    pub fn date_list(&self) -> Vec<NaiveDate> {
        string_list(&self.dates)
            .iter()
            .filter_map(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
            .collect()
    }

    pub fn image_list(&self) -> Vec<Image> {
        Image::list_from_json(&self.images)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::artist::Entity",
        from = "Column::ArtistId",
        to = "super::artist::Column::Id"
    )]
    Artist,
}

impl Related<super::artist::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Artist.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
