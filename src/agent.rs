//! Seam between the job machinery and the per-brand content agent.
//!
//! The agent owns prompt construction, generation, search and social
//! publishing. From the queue's point of view every operation either
//! succeeds or fails with an [`OperationError`].

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::content::{Brand, ContentStore, ContentStoreError, ScheduledPost};

#[derive(Debug, Error)]
pub enum AgentBuildError {
    #[error("Brand {0} not found")]
    BrandNotFound(String),
    #[error("Failed to load brand: {0}")]
    ContentStore(#[from] ContentStoreError),
}

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("scheduled post {0} not found")]
    ScheduledPostNotFound(String),
    #[error("Content store error: {0}")]
    ContentStore(#[from] ContentStoreError),
    #[error("{0}")]
    Failed(String),
}

/// Operations a job can run on behalf of one brand.
#[async_trait]
pub trait BrandAgent: Send + Sync {
    /// Research, generate, evaluate, publish and persist one post.
    async fn run_cycle(&self) -> Result<(), OperationError>;

    /// Refresh analytics of the brand's published posts.
    async fn sync_analytics(&self) -> Result<(), OperationError>;

    /// Generate `count` future posts awaiting approval.
    async fn plan_batch(&self, count: usize) -> Result<(), OperationError>;

    async fn publish_scheduled_post(&self, post: &ScheduledPost) -> Result<(), OperationError>;
}

/// Builds a fresh agent for each job.
#[async_trait]
pub trait AgentFactory: Send + Sync {
    async fn build(&self, brand_id: &str) -> Result<Arc<dyn BrandAgent>, AgentBuildError>;
}

/// Factory whose agents only log what they would do.
///
/// Used by the binary until a generation backend is wired in; it still
/// rejects unknown brands so queue semantics stay the same.
pub struct DryRunAgentFactory {
    content_store: Arc<dyn ContentStore>,
}

impl DryRunAgentFactory {
    #[must_use]
    pub fn new(content_store: Arc<dyn ContentStore>) -> Self {
        Self { content_store }
    }
}

#[async_trait]
impl AgentFactory for DryRunAgentFactory {
    async fn build(&self, brand_id: &str) -> Result<Arc<dyn BrandAgent>, AgentBuildError> {
        let brand = self
            .content_store
            .find_brand(brand_id)
            .await?
            .ok_or_else(|| AgentBuildError::BrandNotFound(brand_id.to_string()))?;

        Ok(Arc::new(DryRunAgent { brand }))
    }
}

struct DryRunAgent {
    brand: Brand,
}

#[async_trait]
impl BrandAgent for DryRunAgent {
    async fn run_cycle(&self) -> Result<(), OperationError> {
        info!("🤖 [dry run] Content cycle for '{}'", self.brand.name);
        Ok(())
    }

    async fn sync_analytics(&self) -> Result<(), OperationError> {
        info!("📊 [dry run] Analytics sync for '{}'", self.brand.name);
        Ok(())
    }

    async fn plan_batch(&self, count: usize) -> Result<(), OperationError> {
        info!(
            "🗓️ [dry run] Planning {count} posts for '{}'",
            self.brand.name
        );
        Ok(())
    }

    async fn publish_scheduled_post(&self, post: &ScheduledPost) -> Result<(), OperationError> {
        info!(
            "📣 [dry run] Publishing '{}' to {} for '{}'",
            post.topic, post.platform, self.brand.name
        );
        Ok(())
    }
}
