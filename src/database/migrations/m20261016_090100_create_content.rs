use sea_orm_migration::{
    prelude::*,
    schema::{integer, string, text, timestamp},
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Brand::Table)
                    .if_not_exists()
                    .col(string(Brand::Id).primary_key())
                    .col(string(Brand::Name))
                    .col(integer(Brand::ScheduleIntervalHours).default(4))
                    .col(timestamp(Brand::CreatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Post::Table)
                    .if_not_exists()
                    .col(string(Post::Id).primary_key())
                    .col(string(Post::BrandId))
                    .col(string(Post::Topic))
                    .col(text(Post::Content))
                    .col(string(Post::Platform))
                    .col(timestamp(Post::CreatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        // History is always read newest-first per brand
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-post-brand_id-created_at")
                    .table(Post::Table)
                    .col(Post::BrandId)
                    .col(Post::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ScheduledPost::Table)
                    .if_not_exists()
                    .col(string(ScheduledPost::Id).primary_key())
                    .col(string(ScheduledPost::BrandId))
                    .col(string(ScheduledPost::Topic))
                    .col(text(ScheduledPost::Content))
                    .col(string(ScheduledPost::Platform))
                    .col(string(ScheduledPost::Status).default("pending"))
                    .col(timestamp(ScheduledPost::ScheduledAt))
                    .col(timestamp(ScheduledPost::CreatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-scheduled_post-status-scheduled_at")
                    .table(ScheduledPost::Table)
                    .col(ScheduledPost::Status)
                    .col(ScheduledPost::ScheduledAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ScheduledPost::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Post::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Brand::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Brand {
    Table,
    Id,
    Name,
    ScheduleIntervalHours,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Post {
    Table,
    Id,
    BrandId,
    Topic,
    Content,
    Platform,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ScheduledPost {
    Table,
    Id,
    BrandId,
    Topic,
    Content,
    Platform,
    Status,
    ScheduledAt,
    CreatedAt,
}
