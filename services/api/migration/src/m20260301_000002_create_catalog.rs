use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Categories::Slug)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Genres::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Genres::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Genres::Name).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Genres::Slug)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Titles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Titles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Titles::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Titles::Year).integer().not_null())
                    .col(ColumnDef::new(Titles::Description).text())
                    .col(ColumnDef::new(Titles::CategoryId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Titles::Table, Titles::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TitleGenres::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TitleGenres::TitleId).integer().not_null())
                    .col(ColumnDef::new(TitleGenres::GenreId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(TitleGenres::TitleId)
                            .col(TitleGenres::GenreId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TitleGenres::Table, TitleGenres::TitleId)
                            .to(Titles::Table, Titles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TitleGenres::Table, TitleGenres::GenreId)
                            .to(Genres::Table, Genres::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Titles::Table)
                    .col(Titles::CategoryId)
                    .name("idx_titles_category_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(TitleGenres::Table)
                    .col(TitleGenres::GenreId)
                    .name("idx_title_genres_genre_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TitleGenres::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Titles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Genres::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    Slug,
}

#[derive(Iden)]
enum Genres {
    Table,
    Id,
    Name,
    Slug,
}

#[derive(Iden)]
enum Titles {
    Table,
    Id,
    Name,
    Year,
    Description,
    CategoryId,
}

#[derive(Iden)]
enum TitleGenres {
    Table,
    TitleId,
    GenreId,
}
