use std::{sync::Arc, time::Duration};

use chrono::NaiveDateTime;
use thiserror::Error;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    config::SchedulerConfig,
    content::{ContentStore, ContentStoreError},
    database::models::{job_type::JobType, scheduled_post_status::ScheduledPostStatus},
    jobs::job_store::{JobStore, JobStoreError},
};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Content store error: {0}")]
    ContentStore(#[from] ContentStoreError),
    #[error("Job store error: {0}")]
    JobStore(#[from] JobStoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// The brand already has a pending or running job.
    AlreadyScheduled,
    Enqueued { job_id: i64, delay: Duration },
}

/// Keeps one cycle job outstanding per brand and turns due approved posts into publish jobs.
pub struct Scheduler {
    config: SchedulerConfig,
    job_store: Arc<dyn JobStore>,
    content_store: Arc<dyn ContentStore>,
}

impl Scheduler {
    #[must_use]
    pub fn new(
        config: SchedulerConfig,
        job_store: Arc<dyn JobStore>,
        content_store: Arc<dyn ContentStore>,
    ) -> Self {
        Self {
            config,
            job_store,
            content_store,
        }
    }

    /// Run one pass immediately, then one per tick until `shutdown` is cancelled.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut ticker = interval(self.config.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "📅 Scheduler started, passing every {:?}",
            self.config.tick_interval()
        );

        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            self.run_pass().await;
        }

        info!("🛑 Scheduler stopped");
    }

    /// Both halves run even if the other one fails.
    pub async fn run_pass(&self) {
        match self.sync_all_brands().await {
            Ok(0) => debug!("📅 Every brand already has a cycle queued"),
            Ok(enqueued) => info!("📅 Queued {enqueued} content cycle(s)"),
            Err(e) => error!("❌ Failed to list brands: {}", e),
        }

        match self.check_scheduled_posts().await {
            Ok(0) => {}
            Ok(promoted) => info!("📣 Queued {promoted} scheduled post(s) for publishing"),
            Err(e) => error!("❌ Failed to load due scheduled posts: {}", e),
        }
    }

    /// Make sure every brand has a cycle outstanding. Returns how many were queued.
    pub async fn sync_all_brands(&self) -> Result<usize, SchedulerError> {
        let brands = self.content_store.list_all_brands().await?;
        let mut enqueued = 0;

        for brand in brands {
            match self
                .ensure_scheduled(&brand.id, brand.schedule_interval_hours)
                .await
            {
                Ok(EnsureOutcome::AlreadyScheduled) => {}
                Ok(EnsureOutcome::Enqueued { job_id, delay }) => {
                    debug!(
                        "📅 Cycle {job_id} for '{}' due in {:?}",
                        brand.id, delay
                    );
                    enqueued += 1;
                }
                Err(e) => {
                    warn!("⚠️ Could not schedule a cycle for '{}': {}", brand.id, e);
                }
            }
        }

        Ok(enqueued)
    }

    /// Queue a cycle for the brand unless one is already pending or running.
    pub async fn ensure_scheduled(
        &self,
        brand_id: &str,
        interval_hours: i32,
    ) -> Result<EnsureOutcome, JobStoreError> {
        let interval_hours = if interval_hours > 0 {
            interval_hours
        } else {
            self.config.default_interval_hours
        };

        if self.job_store.has_pending_job(brand_id).await? {
            return Ok(EnsureOutcome::AlreadyScheduled);
        }

        let last_post_at = match self.content_store.get_history(brand_id).await {
            Ok(history) => history.first().map(|post| post.created_at),
            Err(e) => {
                warn!(
                    "⚠️ Could not read history of '{brand_id}', treating it as new: {}",
                    e
                );
                None
            }
        };

        let now = chrono::Utc::now().naive_utc();
        let delay = next_cycle_delay(last_post_at, interval_hours, now, &self.config);

        let job_id = self
            .job_store
            .enqueue(brand_id, JobType::Cycle, delay, "")
            .await?;

        Ok(EnsureOutcome::Enqueued { job_id, delay })
    }

    /// Queue a publish job for every approved post that is due. Returns how many were queued.
    pub async fn check_scheduled_posts(&self) -> Result<usize, SchedulerError> {
        let posts = self.content_store.get_pending_scheduled_posts().await?;
        let mut promoted = 0;

        for post in posts {
            if let Err(e) = self
                .job_store
                .enqueue(&post.brand_id, JobType::Publish, Duration::ZERO, &post.id)
                .await
            {
                // Left approved, so the next pass picks it up again
                warn!("⚠️ Could not queue publishing of post {}: {}", post.id, e);
                continue;
            }

            promoted += 1;

            // The job exists now; if this fails the post is queued again next pass
            if let Err(e) = self
                .content_store
                .update_scheduled_post_status(&post.id, ScheduledPostStatus::Scheduled)
                .await
            {
                error!(
                    "❌ Queued publishing of post {} but could not mark it scheduled: {}",
                    post.id, e
                );
            }
        }

        Ok(promoted)
    }
}

/// Delay before the next cycle of a brand whose latest post is `last_post_at`.
///
/// Brands without history start after the warm-up delay. Brands whose next
/// cycle is already overdue catch up after a short delay.
#[must_use]
pub fn next_cycle_delay(
    last_post_at: Option<NaiveDateTime>,
    interval_hours: i32,
    now: NaiveDateTime,
    config: &SchedulerConfig,
) -> Duration {
    let Some(last_post_at) = last_post_at else {
        return config.warm_up_delay();
    };

    let Some(target) =
        last_post_at.checked_add_signed(chrono::Duration::hours(i64::from(interval_hours)))
    else {
        return config.warm_up_delay();
    };

    (target - now)
        .to_std()
        .unwrap_or_else(|_| config.catch_up_delay())
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;

    use super::*;
    use crate::{
        content::DatabaseContentStore,
        jobs::job_store::DatabaseJobStore,
        tests::{
            fixtures::{all_jobs, insert_brand, insert_post, insert_scheduled_post},
            setup_test::test_database,
        },
    };
    use sea_orm::DatabaseConnection;

    async fn scheduler() -> (Scheduler, DatabaseConnection) {
        let db = test_database().await;
        let scheduler = Scheduler::new(
            SchedulerConfig::default(),
            Arc::new(DatabaseJobStore::new(db.clone(), Duration::from_secs(300))),
            Arc::new(DatabaseContentStore::new(db.clone())),
        );

        (scheduler, db)
    }

    fn at(hour: u32) -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2026, 10, 16)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .unwrap()
    }

    #[test]
    fn test_brand_without_history_warms_up() {
        let delay = next_cycle_delay(None, 4, at(12), &SchedulerConfig::default());
        assert_eq!(delay, Duration::from_secs(60));
    }

    #[test]
    fn test_overdue_brand_catches_up() {
        let delay = next_cycle_delay(Some(at(7)), 4, at(12), &SchedulerConfig::default());
        assert_eq!(delay, Duration::from_secs(10));
    }

    #[test]
    fn test_next_cycle_follows_interval_after_last_post() {
        let delay = next_cycle_delay(Some(at(11)), 4, at(12), &SchedulerConfig::default());
        assert_eq!(delay, Duration::from_secs(3 * 3600));
    }

    #[tokio::test]
    async fn test_ensure_scheduled_new_brand_starts_after_warm_up() {
        let (scheduler, db) = scheduler().await;

        let outcome = scheduler.ensure_scheduled("acme", 4).await.unwrap();

        assert!(matches!(
            outcome,
            EnsureOutcome::Enqueued { delay, .. } if delay == Duration::from_secs(60)
        ));

        let jobs = all_jobs(&db).await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].r#type, JobType::Cycle);
        assert_eq!(
            jobs[0].next_run_at - jobs[0].created_at,
            ChronoDuration::seconds(60)
        );
    }

    #[tokio::test]
    async fn test_ensure_scheduled_overdue_brand_catches_up() {
        let (scheduler, db) = scheduler().await;
        insert_post(&db, "acme", chrono::Utc::now().naive_utc() - ChronoDuration::hours(5)).await;

        let outcome = scheduler.ensure_scheduled("acme", 4).await.unwrap();

        assert!(matches!(
            outcome,
            EnsureOutcome::Enqueued { delay, .. } if delay == Duration::from_secs(10)
        ));
    }

    #[tokio::test]
    async fn test_ensure_scheduled_falls_back_to_default_interval() {
        let (scheduler, db) = scheduler().await;
        insert_post(&db, "acme", chrono::Utc::now().naive_utc() - ChronoDuration::hours(1)).await;

        let EnsureOutcome::Enqueued { delay, .. } =
            scheduler.ensure_scheduled("acme", 0).await.unwrap()
        else {
            panic!("expected a cycle to be queued");
        };

        assert!(delay <= Duration::from_secs(3 * 3600));
        assert!(delay > Duration::from_secs(3 * 3600 - 60));
    }

    #[tokio::test]
    async fn test_ensure_scheduled_is_idempotent() {
        let (scheduler, db) = scheduler().await;

        scheduler.ensure_scheduled("acme", 4).await.unwrap();
        let second = scheduler.ensure_scheduled("acme", 4).await.unwrap();

        assert_eq!(second, EnsureOutcome::AlreadyScheduled);
        assert_eq!(all_jobs(&db).await.len(), 1);
    }

    #[tokio::test]
    async fn test_sync_all_brands_only_fills_gaps() {
        let (scheduler, db) = scheduler().await;
        insert_brand(&db, "acme", 4).await;
        insert_brand(&db, "globex", 6).await;
        scheduler.ensure_scheduled("acme", 4).await.unwrap();

        let enqueued = scheduler.sync_all_brands().await.unwrap();

        assert_eq!(enqueued, 1);
        let jobs = all_jobs(&db).await;
        assert_eq!(jobs.len(), 2);
        assert!(jobs.iter().any(|job| job.brand_id == "globex"));
    }

    #[tokio::test]
    async fn test_due_approved_post_is_queued_once() {
        let (scheduler, db) = scheduler().await;
        let now = chrono::Utc::now().naive_utc();
        let due = insert_scheduled_post(
            &db,
            "acme",
            ScheduledPostStatus::Approved,
            now - ChronoDuration::minutes(1),
        )
        .await;
        insert_scheduled_post(
            &db,
            "acme",
            ScheduledPostStatus::Approved,
            now + ChronoDuration::hours(2),
        )
        .await;

        assert_eq!(scheduler.check_scheduled_posts().await.unwrap(), 1);
        assert_eq!(scheduler.check_scheduled_posts().await.unwrap(), 0);

        let jobs = all_jobs(&db).await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].r#type, JobType::Publish);
        assert_eq!(jobs[0].payload, due.id);

        let posts = scheduler.content_store.get_scheduled_posts("acme").await.unwrap();
        let due = posts.iter().find(|post| post.id == due.id).unwrap();
        assert_eq!(due.status, ScheduledPostStatus::Scheduled);
    }

    #[tokio::test]
    async fn test_run_passes_immediately_and_stops_on_cancel() {
        let (scheduler, db) = scheduler().await;
        insert_brand(&db, "acme", 4).await;

        let scheduler = Arc::new(scheduler);
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn({
            let scheduler = scheduler.clone();
            let shutdown = shutdown.clone();
            async move { scheduler.run(shutdown).await }
        });

        let mut queued = false;
        for _ in 0..100 {
            if !all_jobs(&db).await.is_empty() {
                queued = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();

        assert!(queued);
    }
}
