use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::{
    agent::{AgentBuildError, AgentFactory, BrandAgent, OperationError},
    content::ScheduledPost,
};

/// An operation a fake agent was asked to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentCall {
    RunCycle(String),
    SyncAnalytics(String),
    PlanBatch(String, usize),
    Publish(String, String),
}

#[derive(Default)]
struct State {
    calls: Vec<AgentCall>,
    failure: Option<String>,
    unknown_brands: HashSet<String>,
}

/// Agent factory that records every operation instead of calling out.
///
/// Every brand is known unless forgotten with [`FakeAgentFactory::forget_brand`].
#[derive(Clone, Default)]
pub struct FakeAgentFactory {
    state: Arc<Mutex<State>>,
}

impl FakeAgentFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following operation fail with `message`.
    pub fn fail_with(&self, message: &str) {
        self.state.lock().unwrap().failure = Some(message.to_string());
    }

    pub fn forget_brand(&self, brand_id: &str) {
        self.state
            .lock()
            .unwrap()
            .unknown_brands
            .insert(brand_id.to_string());
    }

    #[must_use]
    pub fn calls(&self) -> Vec<AgentCall> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl AgentFactory for FakeAgentFactory {
    async fn build(&self, brand_id: &str) -> Result<Arc<dyn BrandAgent>, AgentBuildError> {
        if self.state.lock().unwrap().unknown_brands.contains(brand_id) {
            return Err(AgentBuildError::BrandNotFound(brand_id.to_string()));
        }

        Ok(Arc::new(FakeAgent {
            brand_id: brand_id.to_string(),
            state: self.state.clone(),
        }))
    }
}

struct FakeAgent {
    brand_id: String,
    state: Arc<Mutex<State>>,
}

impl FakeAgent {
    fn record(&self, call: AgentCall) -> Result<(), OperationError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);

        match &state.failure {
            Some(message) => Err(OperationError::Failed(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BrandAgent for FakeAgent {
    async fn run_cycle(&self) -> Result<(), OperationError> {
        self.record(AgentCall::RunCycle(self.brand_id.clone()))
    }

    async fn sync_analytics(&self) -> Result<(), OperationError> {
        self.record(AgentCall::SyncAnalytics(self.brand_id.clone()))
    }

    async fn plan_batch(&self, count: usize) -> Result<(), OperationError> {
        self.record(AgentCall::PlanBatch(self.brand_id.clone(), count))
    }

    async fn publish_scheduled_post(&self, post: &ScheduledPost) -> Result<(), OperationError> {
        self.record(AgentCall::Publish(self.brand_id.clone(), post.id.clone()))
    }
}
