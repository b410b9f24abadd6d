//! Migration to create the artists table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Artists::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Artists::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Artists::Name).text().not_null())
                    .col(ColumnDef::new(Artists::Slug).text().not_null())
                    .col(ColumnDef::new(Artists::Genres).json_binary().not_null())
                    .col(ColumnDef::new(Artists::Bio).text().not_null())
                    .col(ColumnDef::new(Artists::Origin).text().not_null())
                    .col(ColumnDef::new(Artists::Images).json_binary().null())
                    .col(ColumnDef::new(Artists::SocialLinks).json_binary().null())
                    .col(
                        ColumnDef::new(Artists::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_artists_slug")
                    .table(Artists::Table)
                    .col(Artists::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_artists_slug").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Artists::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Artists {
    Table,
    Id,
    Name,
    Slug,
    Genres,
    Bio,
    Origin,
    Images,
    SocialLinks,
    CreatedAt,
}
