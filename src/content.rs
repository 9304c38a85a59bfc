//! Read/write access to the brand-owned content the scheduler and workers need.

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};
use thiserror::Error;

use crate::database::models::{
    brand::{self, Entity as BrandEntity},
    post::{self, Entity as PostEntity},
    scheduled_post::{self, Entity as ScheduledPostEntity},
    scheduled_post_status::ScheduledPostStatus,
};

pub use crate::database::models::{
    brand::Model as Brand, post::Model as Post, scheduled_post::Model as ScheduledPost,
};

#[derive(Debug, Error)]
pub enum ContentStoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    #[error("Scheduled post {0} not found")]
    ScheduledPostNotFound(String),
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn list_all_brands(&self) -> Result<Vec<Brand>, ContentStoreError>;

    async fn find_brand(&self, brand_id: &str) -> Result<Option<Brand>, ContentStoreError>;

    /// Published posts of a brand, most recent first.
    async fn get_history(&self, brand_id: &str) -> Result<Vec<Post>, ContentStoreError>;

    async fn get_scheduled_posts(
        &self,
        brand_id: &str,
    ) -> Result<Vec<ScheduledPost>, ContentStoreError>;

    /// Approved posts whose publish time has come, across all brands.
    async fn get_pending_scheduled_posts(&self) -> Result<Vec<ScheduledPost>, ContentStoreError>;

    async fn update_scheduled_post_status(
        &self,
        id: &str,
        status: ScheduledPostStatus,
    ) -> Result<(), ContentStoreError>;
}

#[derive(Clone, Debug)]
pub struct DatabaseContentStore {
    db: DatabaseConnection,
}

impl DatabaseContentStore {
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContentStore for DatabaseContentStore {
    async fn list_all_brands(&self) -> Result<Vec<Brand>, ContentStoreError> {
        Ok(BrandEntity::find()
            .order_by_asc(brand::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn find_brand(&self, brand_id: &str) -> Result<Option<Brand>, ContentStoreError> {
        Ok(BrandEntity::find_by_id(brand_id.to_string())
            .one(&self.db)
            .await?)
    }

    async fn get_history(&self, brand_id: &str) -> Result<Vec<Post>, ContentStoreError> {
        Ok(PostEntity::find()
            .filter(post::Column::BrandId.eq(brand_id))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn get_scheduled_posts(
        &self,
        brand_id: &str,
    ) -> Result<Vec<ScheduledPost>, ContentStoreError> {
        Ok(ScheduledPostEntity::find()
            .filter(scheduled_post::Column::BrandId.eq(brand_id))
            .order_by_asc(scheduled_post::Column::ScheduledAt)
            .all(&self.db)
            .await?)
    }

    async fn get_pending_scheduled_posts(&self) -> Result<Vec<ScheduledPost>, ContentStoreError> {
        let now = chrono::Utc::now().naive_utc();

        Ok(ScheduledPostEntity::find()
            .filter(scheduled_post::Column::Status.eq(ScheduledPostStatus::Approved))
            .filter(scheduled_post::Column::ScheduledAt.lte(now))
            .order_by_asc(scheduled_post::Column::ScheduledAt)
            .all(&self.db)
            .await?)
    }

    async fn update_scheduled_post_status(
        &self,
        id: &str,
        status: ScheduledPostStatus,
    ) -> Result<(), ContentStoreError> {
        let result = ScheduledPostEntity::update_many()
            .set(scheduled_post::ActiveModel {
                status: Set(status),
                ..Default::default()
            })
            .filter(scheduled_post::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ContentStoreError::ScheduledPostNotFound(id.to_string()));
        }

        Ok(())
    }
}
