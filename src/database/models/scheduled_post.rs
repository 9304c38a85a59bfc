//! `SeaORM` Entity for posts planned for a future publish time

use crate::database::models::scheduled_post_status::ScheduledPostStatus;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "scheduled_post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub brand_id: String,
    pub topic: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub platform: String,
    pub status: ScheduledPostStatus,
    pub scheduled_at: DateTime,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
