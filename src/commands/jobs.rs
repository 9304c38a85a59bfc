use std::{process, time::Duration};

use crate::{
    cli::JobsAction,
    config::Config,
    database::setup_database_connection,
    jobs::job_store::{DatabaseJobStore, Job, JobStore, JobStoreError},
};

pub async fn handle_jobs_command(config: &Config, action: JobsAction) {
    let db = match setup_database_connection(&config.database).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("❌ Could not connect to the database: {e}");
            process::exit(1);
        }
    };

    let job_store = DatabaseJobStore::new(db, config.jobs.worker.retry_backoff());

    if let Err(e) = handle_jobs_action(&job_store, action).await {
        eprintln!("❌ {e}");
        process::exit(1);
    }
}

fn describe(job: &Job) -> String {
    format!(
        "{:>6}  {:<8} {:<20} retries={} updated={} {}",
        job.id,
        job.r#type,
        job.brand_id,
        job.retries,
        job.updated_at.format("%Y-%m-%d %H:%M:%S"),
        job.error.as_deref().unwrap_or("")
    )
}

pub async fn handle_jobs_action(
    job_store: &dyn JobStore,
    action: JobsAction,
) -> Result<(), JobStoreError> {
    match action {
        JobsAction::Failed => {
            let failed = job_store.failed_jobs().await?;

            if failed.is_empty() {
                println!("✅ No failed jobs");
            } else {
                println!("📋 {} failed job(s):", failed.len());
                for job in &failed {
                    println!("{}", describe(job));
                }
            }
        }
        JobsAction::Stuck { older_than_seconds } => {
            let stuck = job_store
                .stuck_jobs(Duration::from_secs(older_than_seconds))
                .await?;

            if stuck.is_empty() {
                println!("✅ No job has been running for {older_than_seconds}s or more");
            } else {
                println!("🐌 {} stuck job(s):", stuck.len());
                for job in &stuck {
                    println!("{}", describe(job));
                }
            }
        }
        JobsAction::Requeue { id } => {
            job_store.requeue(id).await?;
            println!("✅ Job {id} is pending again and due now");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        database::models::{job_status::JobStatus, job_type::JobType},
        tests::setup_test::test_database,
    };

    #[tokio::test]
    async fn test_requeue_action_restores_failed_job() {
        let store = DatabaseJobStore::new(test_database().await, Duration::from_secs(300));
        let id = store
            .enqueue("acme", JobType::Sync, Duration::ZERO, "")
            .await
            .unwrap();
        store.dequeue().await.unwrap();
        store.fail(id, "brand not found", false).await.unwrap();

        handle_jobs_action(&store, JobsAction::Failed).await.unwrap();
        handle_jobs_action(&store, JobsAction::Requeue { id })
            .await
            .unwrap();

        assert_eq!(
            store.get(id).await.unwrap().unwrap().status,
            JobStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_requeue_action_rejects_unknown_job() {
        let store = DatabaseJobStore::new(test_database().await, Duration::from_secs(300));

        let result = handle_jobs_action(&store, JobsAction::Requeue { id: 42 }).await;

        assert!(matches!(result, Err(JobStoreError::NotFound(42))));
    }
}
