use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MagicLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MagicLinks::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MagicLinks::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(MagicLinks::Token)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(MagicLinks::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MagicLinks::UsedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(MagicLinks::IpAddress).string())
                    .col(ColumnDef::new(MagicLinks::UserAgent).text())
                    .col(
                        ColumnDef::new(MagicLinks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(MagicLinks::Table, MagicLinks::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Serves the invalidate-priors sweep (all unused links for one user).
        manager
            .create_index(
                Index::create()
                    .table(MagicLinks::Table)
                    .col(MagicLinks::UserId)
                    .col(MagicLinks::UsedAt)
                    .name("idx_magic_links_user_id_used_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MagicLinks::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MagicLinks {
    Table,
    Id,
    UserId,
    Token,
    ExpiresAt,
    UsedAt,
    IpAddress,
    UserAgent,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
