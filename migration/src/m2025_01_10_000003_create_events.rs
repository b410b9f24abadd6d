//! Migration to create the events table.
//!
//! Events reference an artist by id and carry denormalized artist name/slug
//! for listing. `is_deleted` backs the soft-delete lifecycle.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Events::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Events::Title).text().not_null())
                    .col(ColumnDef::new(Events::Slug).text().not_null())
                    .col(ColumnDef::new(Events::Dates).json_binary().not_null())
                    .col(ColumnDef::new(Events::Organizer).text().not_null())
                    .col(ColumnDef::new(Events::ArtistId).uuid().not_null())
                    .col(ColumnDef::new(Events::ArtistName).text().not_null())
                    .col(ColumnDef::new(Events::ArtistSlug).text().not_null())
                    .col(ColumnDef::new(Events::Genre).text().not_null())
                    .col(ColumnDef::new(Events::Location).text().not_null())
                    .col(ColumnDef::new(Events::Time).text().not_null())
                    .col(ColumnDef::new(Events::Price).text().null())
                    .col(ColumnDef::new(Events::Description).text().null())
                    .col(ColumnDef::new(Events::Images).json_binary().not_null())
                    .col(
                        ColumnDef::new(Events::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Events::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Events::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_artist_id")
                            .from(Events::Table, Events::ArtistId)
                            .to(Artists::Table, Artists::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_events_slug")
                    .table(Events::Table)
                    .col(Events::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Listing queries always filter on the soft-delete flag
        manager
            .create_index(
                Index::create()
                    .name("idx_events_is_deleted")
                    .table(Events::Table)
                    .col(Events::IsDeleted)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_events_artist_id")
                    .table(Events::Table)
                    .col(Events::ArtistId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in ["idx_events_artist_id", "idx_events_is_deleted", "idx_events_slug"] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }

        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    Title,
    Slug,
    Dates,
    Organizer,
    ArtistId,
    ArtistName,
    ArtistSlug,
    Genre,
    Location,
    Time,
    Price,
    Description,
    Images,
    IsDeleted,
    DeletedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Artists {
    Table,
    Id,
}
