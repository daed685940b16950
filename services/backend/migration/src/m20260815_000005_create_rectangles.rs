use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rectangles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rectangles::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rectangles::UserId).uuid().not_null())
                    .col(ColumnDef::new(Rectangles::Name).string().not_null())
                    .col(
                        ColumnDef::new(Rectangles::Coordinates)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rectangles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rectangles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Rectangles::Table, Rectangles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Backstop for the per-user name uniqueness enforced in the usecase layer.
        manager
            .create_index(
                Index::create()
                    .table(Rectangles::Table)
                    .col(Rectangles::UserId)
                    .col(Rectangles::Name)
                    .name("idx_rectangles_user_id_name")
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rectangles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Rectangles {
    Table,
    Id,
    UserId,
    Name,
    Coordinates,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
