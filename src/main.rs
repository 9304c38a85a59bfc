use std::sync::Arc;

use cadence::{
    agent::{AgentFactory, DryRunAgentFactory},
    app::App,
    app_info::AppInfo,
    boot::{boot, BootConfig},
};

fn agent_factory(app: &App) -> Arc<dyn AgentFactory> {
    Arc::new(DryRunAgentFactory::new(app.content_store.clone()))
}

#[tokio::main]
async fn main() {
    boot(BootConfig::new(AppInfo::cadence(), agent_factory)).await;
}
