use sea_orm_migration::{
    prelude::*,
    schema::{integer, pk_auto, string, text, text_null, timestamp},
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Job::Table)
                    .if_not_exists()
                    .col(pk_auto(Job::Id))
                    .col(string(Job::BrandId))
                    .col(string(Job::Type))
                    .col(string(Job::Status).default("pending"))
                    .col(integer(Job::Retries).default(0))
                    .col(timestamp(Job::NextRunAt))
                    .col(text(Job::Payload).default(""))
                    .col(text_null(Job::Error))
                    .col(timestamp(Job::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(Job::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        // Claims scan pending jobs by due time
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-job-status-next_run_at")
                    .table(Job::Table)
                    .col(Job::Status)
                    .col(Job::NextRunAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-job-brand_id")
                    .table(Job::Table)
                    .col(Job::BrandId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Job::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Job {
    Table,
    Id,
    BrandId,
    Type,
    Status,
    Retries,
    NextRunAt,
    Payload,
    Error,
    CreatedAt,
    UpdatedAt,
}
