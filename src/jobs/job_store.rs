use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sea_orm::{
    sea_query::Expr, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, Set,
};
use strum::IntoEnumIterator as _;
use thiserror::Error;
use tracing::{debug, trace};

use crate::database::models::{
    job::{self, Entity as JobEntity},
    job_status::JobStatus,
    job_type::JobType,
};

pub use crate::database::models::job::Model as Job;

#[derive(Debug, Error)]
pub enum JobStoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    #[error("Job {0} is not running")]
    NotRunning(i64),
    #[error("Job {0} not found or not eligible")]
    NotFound(i64),
    #[error("Delay of {0:?} is out of range")]
    DelayOutOfRange(Duration),
}

/// Durable queue shared by the scheduler, the workers and the triggers.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Create a pending job due after `delay`. Returns the new job id.
    async fn enqueue(
        &self,
        brand_id: &str,
        job_type: JobType,
        delay: Duration,
        payload: &str,
    ) -> Result<i64, JobStoreError>;

    /// Atomically claim the oldest due pending job and mark it running.
    async fn dequeue(&self) -> Result<Option<Job>, JobStoreError>;

    /// Remove a completed job. Unknown ids are ignored.
    async fn ack(&self, id: i64) -> Result<(), JobStoreError>;

    /// Record a failure of a running job, either rescheduling it or marking it failed.
    async fn fail(&self, id: i64, message: &str, retry: bool) -> Result<(), JobStoreError>;

    /// Whether the brand has a pending or running job.
    async fn has_pending_job(&self, brand_id: &str) -> Result<bool, JobStoreError>;

    async fn get(&self, id: i64) -> Result<Option<Job>, JobStoreError>;

    async fn failed_jobs(&self) -> Result<Vec<Job>, JobStoreError>;

    /// Running jobs untouched for at least `older_than`.
    async fn stuck_jobs(&self, older_than: Duration) -> Result<Vec<Job>, JobStoreError>;

    /// Put a failed or stuck job back in the queue, due now with a fresh retry budget.
    async fn requeue(&self, id: i64) -> Result<(), JobStoreError>;
}

#[derive(Clone, Debug)]
pub struct DatabaseJobStore {
    db: DatabaseConnection,
    retry_backoff: Duration,
}

impl DatabaseJobStore {
    #[must_use]
    pub const fn new(db: DatabaseConnection, retry_backoff: Duration) -> Self {
        Self { db, retry_backoff }
    }
}

fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

fn shift(from: NaiveDateTime, delay: Duration) -> Result<NaiveDateTime, JobStoreError> {
    chrono::Duration::from_std(delay)
        .ok()
        .and_then(|delta| from.checked_add_signed(delta))
        .ok_or(JobStoreError::DelayOutOfRange(delay))
}

fn rewind(from: NaiveDateTime, delay: Duration) -> Result<NaiveDateTime, JobStoreError> {
    chrono::Duration::from_std(delay)
        .ok()
        .and_then(|delta| from.checked_sub_signed(delta))
        .ok_or(JobStoreError::DelayOutOfRange(delay))
}

#[async_trait]
impl JobStore for DatabaseJobStore {
    async fn enqueue(
        &self,
        brand_id: &str,
        job_type: JobType,
        delay: Duration,
        payload: &str,
    ) -> Result<i64, JobStoreError> {
        let now = now();
        let next_run_at = shift(now, delay)?;

        let job = job::ActiveModel {
            brand_id: Set(brand_id.to_string()),
            r#type: Set(job_type),
            status: Set(JobStatus::Pending),
            retries: Set(0),
            next_run_at: Set(next_run_at),
            payload: Set(payload.to_string()),
            error: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = JobEntity::insert(job).exec(&self.db).await?;

        debug!(
            "📥 Enqueued {job_type}({}) for brand '{brand_id}' due at {next_run_at}",
            result.last_insert_id
        );

        Ok(result.last_insert_id)
    }

    async fn dequeue(&self) -> Result<Option<Job>, JobStoreError> {
        let now = now();

        let oldest_due = JobEntity::find()
            .select_only()
            .column(job::Column::Id)
            .filter(job::Column::Status.eq(JobStatus::Pending))
            .filter(job::Column::NextRunAt.lte(now))
            .order_by_asc(job::Column::NextRunAt)
            .order_by_asc(job::Column::Id)
            .limit(1)
            .into_query();

        // Selecting and claiming in one statement takes the write lock up front,
        // so concurrent claimers wait on the busy timeout instead of failing
        let claimed = JobEntity::update_many()
            .set(job::ActiveModel {
                status: Set(JobStatus::Running),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(job::Column::Id.in_subquery(oldest_due))
            .filter(job::Column::Status.eq(JobStatus::Pending))
            .exec_with_returning(&self.db)
            .await?;

        let job = claimed.into_iter().next();

        if let Some(job) = &job {
            trace!("Claimed {}({}) for brand '{}'", job.r#type, job.id, job.brand_id);
        }

        Ok(job)
    }

    async fn ack(&self, id: i64) -> Result<(), JobStoreError> {
        JobEntity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    async fn fail(&self, id: i64, message: &str, retry: bool) -> Result<(), JobStoreError> {
        let now = now();

        let update = JobEntity::update_many()
            .filter(job::Column::Id.eq(id))
            .filter(job::Column::Status.eq(JobStatus::Running));

        let update = if retry {
            update
                .set(job::ActiveModel {
                    status: Set(JobStatus::Pending),
                    next_run_at: Set(shift(now, self.retry_backoff)?),
                    error: Set(Some(message.to_string())),
                    updated_at: Set(now),
                    ..Default::default()
                })
                .col_expr(job::Column::Retries, Expr::col(job::Column::Retries).add(1))
        } else {
            update.set(job::ActiveModel {
                status: Set(JobStatus::Failed),
                error: Set(Some(message.to_string())),
                updated_at: Set(now),
                ..Default::default()
            })
        };

        let result = update.exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(JobStoreError::NotRunning(id));
        }

        Ok(())
    }

    async fn has_pending_job(&self, brand_id: &str) -> Result<bool, JobStoreError> {
        let outstanding = JobEntity::find()
            .filter(job::Column::BrandId.eq(brand_id))
            .filter(
                job::Column::Status.is_in(JobStatus::iter().filter(JobStatus::is_outstanding)),
            )
            .count(&self.db)
            .await?;

        Ok(outstanding > 0)
    }

    async fn get(&self, id: i64) -> Result<Option<Job>, JobStoreError> {
        Ok(JobEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn failed_jobs(&self) -> Result<Vec<Job>, JobStoreError> {
        Ok(JobEntity::find()
            .filter(job::Column::Status.eq(JobStatus::Failed))
            .order_by_desc(job::Column::UpdatedAt)
            .all(&self.db)
            .await?)
    }

    async fn stuck_jobs(&self, older_than: Duration) -> Result<Vec<Job>, JobStoreError> {
        let cutoff = rewind(now(), older_than)?;

        Ok(JobEntity::find()
            .filter(job::Column::Status.eq(JobStatus::Running))
            .filter(job::Column::UpdatedAt.lte(cutoff))
            .order_by_asc(job::Column::UpdatedAt)
            .all(&self.db)
            .await?)
    }

    async fn requeue(&self, id: i64) -> Result<(), JobStoreError> {
        let now = now();

        let result = JobEntity::update_many()
            .set(job::ActiveModel {
                status: Set(JobStatus::Pending),
                retries: Set(0),
                next_run_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(job::Column::Id.eq(id))
            .filter(job::Column::Status.is_in([JobStatus::Failed, JobStatus::Running]))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(JobStoreError::NotFound(id));
        }

        Ok(())
    }
}
