use std::{process, time::Duration};

use thiserror::Error;

use crate::{
    config::Config,
    content::{ContentStore, ContentStoreError, DatabaseContentStore},
    database::{models::job_type::JobType, setup_database_connection},
    jobs::job_store::{DatabaseJobStore, JobStore, JobStoreError},
};

#[derive(Debug, Error)]
pub enum EnqueueError {
    #[error("Brand {0} not found")]
    BrandNotFound(String),
    #[error(transparent)]
    ContentStore(#[from] ContentStoreError),
    #[error(transparent)]
    JobStore(#[from] JobStoreError),
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub async fn handle_enqueue_command(
    config: &Config,
    brand_id: &str,
    job_type: JobType,
    delay_seconds: u64,
    payload: &str,
) {
    match run(config, brand_id, job_type, Duration::from_secs(delay_seconds), payload).await {
        Ok(job_id) => {
            println!("✅ Queued {job_type}({job_id}) for brand '{brand_id}' in {delay_seconds}s");
        }
        Err(e) => {
            eprintln!("❌ Could not queue {job_type} for brand '{brand_id}': {e}");
            process::exit(1);
        }
    }
}

async fn run(
    config: &Config,
    brand_id: &str,
    job_type: JobType,
    delay: Duration,
    payload: &str,
) -> Result<i64, EnqueueError> {
    let db = setup_database_connection(&config.database).await?;

    let content_store = DatabaseContentStore::new(db.clone());
    let job_store = DatabaseJobStore::new(db, config.jobs.worker.retry_backoff());

    enqueue_for_brand(&content_store, &job_store, brand_id, job_type, delay, payload).await
}

/// Queue a job for an existing brand.
pub async fn enqueue_for_brand(
    content_store: &dyn ContentStore,
    job_store: &dyn JobStore,
    brand_id: &str,
    job_type: JobType,
    delay: Duration,
    payload: &str,
) -> Result<i64, EnqueueError> {
    if content_store.find_brand(brand_id).await?.is_none() {
        return Err(EnqueueError::BrandNotFound(brand_id.to_string()));
    }

    Ok(job_store.enqueue(brand_id, job_type, delay, payload).await?)
}
