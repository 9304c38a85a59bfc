use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    agent::{BrandAgent, OperationError},
    content::ContentStore,
    database::models::{job_type::JobType, scheduled_post_status::ScheduledPostStatus},
    jobs::job_store::Job,
};

/// Maps a claimed job onto the matching agent operation.
#[derive(Clone)]
pub struct Dispatcher {
    content_store: Arc<dyn ContentStore>,
    plan_batch_size: usize,
}

impl Dispatcher {
    #[must_use]
    pub fn new(content_store: Arc<dyn ContentStore>, plan_batch_size: usize) -> Self {
        Self {
            content_store,
            plan_batch_size,
        }
    }

    pub async fn dispatch(&self, agent: &dyn BrandAgent, job: &Job) -> Result<(), OperationError> {
        match job.r#type {
            JobType::Cycle => agent.run_cycle().await,
            JobType::Sync => agent.sync_analytics().await,
            JobType::BatchPlan => agent.plan_batch(self.plan_batch_size).await,
            JobType::Publish => self.publish(agent, &job.brand_id, &job.payload).await,
        }
    }

    async fn publish(
        &self,
        agent: &dyn BrandAgent,
        brand_id: &str,
        post_id: &str,
    ) -> Result<(), OperationError> {
        let post = self
            .content_store
            .get_scheduled_posts(brand_id)
            .await?
            .into_iter()
            .find(|post| post.id == post_id)
            .ok_or_else(|| OperationError::ScheduledPostNotFound(post_id.to_string()))?;

        agent.publish_scheduled_post(&post).await?;

        // The post is out once the agent returns; retrying would publish it twice
        if let Err(e) = self
            .content_store
            .update_scheduled_post_status(&post.id, ScheduledPostStatus::Published)
            .await
        {
            warn!(
                "⚠️ Scheduled post {} of '{brand_id}' was published but not marked: {}",
                post.id, e
            );
            return Ok(());
        }

        debug!("📣 Scheduled post {} of '{brand_id}' published", post.id);

        Ok(())
    }
}
