use std::{sync::Arc, time::Instant};

use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    agent::AgentFactory,
    config::WorkerConfig,
    content::ContentStore,
    jobs::{
        dispatcher::Dispatcher,
        job_result::JobResult,
        job_store::{Job, JobStore, JobStoreError},
        JobError,
    },
};

/// Claims due jobs one at a time and writes their outcome back to the store.
pub struct Worker {
    name: String,
    config: WorkerConfig,
    job_store: Arc<dyn JobStore>,
    agent_factory: Arc<dyn AgentFactory>,
    dispatcher: Dispatcher,
}

impl Worker {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        config: WorkerConfig,
        job_store: Arc<dyn JobStore>,
        content_store: Arc<dyn ContentStore>,
        agent_factory: Arc<dyn AgentFactory>,
    ) -> Self {
        let dispatcher = Dispatcher::new(content_store, config.plan_batch_size);

        Self {
            name: name.into(),
            config,
            job_store,
            agent_factory,
            dispatcher,
        }
    }

    /// Poll until `shutdown` is cancelled. A job already claimed is always resolved.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut ticker = interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(
            "Worker '{}' polling every {:?}",
            self.name,
            self.config.poll_interval()
        );

        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            if let Err(e) = self.process_next().await {
                error!("❌ Worker '{}' could not poll the queue: {}", self.name, e);
            }
        }

        info!("🛑 Worker '{}' stopped", self.name);
    }

    /// Claim, run and resolve at most one job.
    ///
    /// Only a failing claim is reported as an error. Failures to record the
    /// outcome are logged, the job then stays running until an operator
    /// requeues it.
    pub async fn process_next(&self) -> Result<Option<JobResult>, JobStoreError> {
        let Some(job) = self.job_store.dequeue().await? else {
            return Ok(None);
        };

        debug!(
            "🔧 Worker '{}' claimed {}({}) for brand '{}'",
            self.name, job.r#type, job.id, job.brand_id
        );

        let started = Instant::now();
        let result = self.execute(&job).await;

        if let Err(e) = self.resolve(&job, &result, started).await {
            error!(
                "❌ Worker '{}' could not record the outcome of {}({}): {}",
                self.name, job.r#type, job.id, e
            );
        }

        Ok(Some(result))
    }

    async fn execute(&self, job: &Job) -> JobResult {
        let agent = match self.agent_factory.build(&job.brand_id).await {
            Ok(agent) => agent,
            Err(e) => return JobResult::Failed(JobError::FailPermanently(e.to_string())),
        };

        match self.dispatcher.dispatch(agent.as_ref(), job).await {
            Ok(()) => JobResult::Completed,
            Err(e) => JobResult::Failed(JobError::TryAgainLater(e.to_string())),
        }
    }

    async fn resolve(
        &self,
        job: &Job,
        result: &JobResult,
        started: Instant,
    ) -> Result<(), JobStoreError> {
        let JobResult::Failed(reason) = result else {
            info!(
                "✅ Worker '{}' completed {}({}) for brand '{}' in {:?}",
                self.name,
                job.r#type,
                job.id,
                job.brand_id,
                started.elapsed()
            );
            return self.job_store.ack(job.id).await;
        };

        let retry = result.should_retry(job.retries, self.config.max_retries);

        if retry {
            warn!(
                "⚠️ Worker '{}' retrying {}({}) after attempt {}: {}",
                self.name,
                job.r#type,
                job.id,
                job.retries + 1,
                reason
            );
        } else {
            error!(
                "❌ Worker '{}' failed {}({}) for brand '{}': {}",
                self.name, job.r#type, job.id, job.brand_id, reason
            );
        }

        self.job_store
            .fail(job.id, &reason.to_string(), retry)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        content::DatabaseContentStore,
        database::models::{
            job_status::JobStatus, job_type::JobType,
            scheduled_post_status::ScheduledPostStatus,
        },
        jobs::job_store::DatabaseJobStore,
        tests::{
            fake_agent::{AgentCall, FakeAgentFactory},
            fixtures::{insert_brand, insert_scheduled_post, make_due},
            setup_test::test_database,
        },
    };
    use sea_orm::DatabaseConnection;

    struct Harness {
        db: DatabaseConnection,
        store: Arc<DatabaseJobStore>,
        content: Arc<DatabaseContentStore>,
        agents: FakeAgentFactory,
        worker: Worker,
    }

    async fn harness() -> Harness {
        let db = test_database().await;
        let store = Arc::new(DatabaseJobStore::new(db.clone(), Duration::from_secs(300)));
        let content = Arc::new(DatabaseContentStore::new(db.clone()));
        let agents = FakeAgentFactory::new();

        let worker = Worker::new(
            "worker-test",
            WorkerConfig::default(),
            store.clone(),
            content.clone(),
            Arc::new(agents.clone()),
        );

        Harness {
            db,
            store,
            content,
            agents,
            worker,
        }
    }

    #[tokio::test]
    async fn test_idle_queue_processes_nothing() {
        let h = harness().await;

        assert!(h.worker.process_next().await.unwrap().is_none());
        assert!(h.agents.calls().is_empty());
    }

    #[tokio::test]
    async fn test_successful_job_is_acked() {
        let h = harness().await;
        let id = h
            .store
            .enqueue("acme", JobType::Cycle, Duration::ZERO, "")
            .await
            .unwrap();

        let result = h.worker.process_next().await.unwrap();

        assert!(matches!(result, Some(JobResult::Completed)));
        assert!(h.store.get(id).await.unwrap().is_none());
        assert_eq!(h.agents.calls(), vec![AgentCall::RunCycle("acme".into())]);
    }

    #[tokio::test]
    async fn test_job_types_dispatch_to_matching_operations() {
        let h = harness().await;
        h.store
            .enqueue("acme", JobType::Sync, Duration::ZERO, "")
            .await
            .unwrap();
        h.store
            .enqueue("acme", JobType::BatchPlan, Duration::ZERO, "")
            .await
            .unwrap();

        h.worker.process_next().await.unwrap();
        h.worker.process_next().await.unwrap();

        assert_eq!(
            h.agents.calls(),
            vec![
                AgentCall::SyncAnalytics("acme".into()),
                AgentCall::PlanBatch("acme".into(), 5),
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_brand_fails_permanently() {
        let h = harness().await;
        h.agents.forget_brand("ghost");
        let id = h
            .store
            .enqueue("ghost", JobType::Cycle, Duration::ZERO, "")
            .await
            .unwrap();

        let result = h.worker.process_next().await.unwrap();
        assert!(matches!(
            result,
            Some(JobResult::Failed(JobError::FailPermanently(_)))
        ));

        let job = h.store.get(id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.retries, 0);
        assert!(job.error.unwrap().contains("ghost"));
    }

    #[tokio::test]
    async fn test_operation_failures_retry_until_budget_is_exhausted() {
        let h = harness().await;
        h.agents.fail_with("model overloaded");
        let id = h
            .store
            .enqueue("acme", JobType::Cycle, Duration::ZERO, "")
            .await
            .unwrap();

        for attempt in 1..=3 {
            h.worker.process_next().await.unwrap().unwrap();

            let job = h.store.get(id).await.unwrap().unwrap();
            assert_eq!(job.status, JobStatus::Pending);
            assert_eq!(job.retries, attempt);
            assert_eq!(job.error.as_deref(), Some("model overloaded"));

            make_due(&h.db, id, chrono::Duration::zero()).await;
        }

        h.worker.process_next().await.unwrap().unwrap();

        let job = h.store.get(id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.retries, 3);
        assert!(h.worker.process_next().await.unwrap().is_none());
        assert_eq!(h.agents.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_publish_of_missing_post_fails_after_retries() {
        let h = harness().await;
        let id = h
            .store
            .enqueue("acme", JobType::Publish, Duration::ZERO, "missing-post")
            .await
            .unwrap();

        for attempt in 1..=3 {
            let result = h.worker.process_next().await.unwrap();
            assert!(matches!(
                result,
                Some(JobResult::Failed(JobError::TryAgainLater(_)))
            ));

            let job = h.store.get(id).await.unwrap().unwrap();
            assert_eq!(job.status, JobStatus::Pending);
            assert_eq!(job.retries, attempt);

            make_due(&h.db, id, chrono::Duration::zero()).await;
        }

        h.worker.process_next().await.unwrap().unwrap();

        let job = h.store.get(id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.retries, 3);
        assert_eq!(
            job.error.as_deref(),
            Some("scheduled post missing-post not found")
        );
        assert!(h.worker.process_next().await.unwrap().is_none());
        assert!(h.agents.calls().is_empty());
    }

    #[tokio::test]
    async fn test_publish_marks_post_published() {
        let h = harness().await;
        insert_brand(&h.db, "acme", 4).await;
        let post = insert_scheduled_post(
            &h.db,
            "acme",
            ScheduledPostStatus::Scheduled,
            chrono::Utc::now().naive_utc(),
        )
        .await;
        h.store
            .enqueue("acme", JobType::Publish, Duration::ZERO, &post.id)
            .await
            .unwrap();

        let result = h.worker.process_next().await.unwrap();

        assert!(matches!(result, Some(JobResult::Completed)));
        assert_eq!(
            h.agents.calls(),
            vec![AgentCall::Publish("acme".into(), post.id.clone())]
        );

        let posts = h.content.get_scheduled_posts("acme").await.unwrap();
        assert_eq!(posts[0].status, ScheduledPostStatus::Published);
    }

    #[tokio::test]
    async fn test_run_stops_when_cancelled() {
        let h = harness().await;
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        tokio::time::timeout(Duration::from_secs(5), h.worker.run(shutdown))
            .await
            .unwrap();
    }
}
