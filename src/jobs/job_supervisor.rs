use std::{sync::Arc, time::Duration};

use tokio::{
    spawn,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    agent::AgentFactory,
    app::App,
    config::{JobsConfig, SchedulerConfig, WorkerConfig},
    jobs::{
        job_store::{JobStore, JobStoreError},
        scheduler::Scheduler,
        worker::Worker,
    },
};

/// Run the worker pool, the scheduler and the optional stuck-job reporter
/// until `shutdown` is cancelled and every task has wound down.
pub async fn job_supervisor(
    jobs_config: JobsConfig,
    app: App,
    agent_factory: Arc<dyn AgentFactory>,
    shutdown: CancellationToken,
) {
    let mut handles = start_workers(&jobs_config.worker, &app, &agent_factory, &shutdown);

    handles.push(start_scheduler(&jobs_config.scheduler, &app, &shutdown));

    if let Some((every, threshold)) = jobs_config.diagnostics.stuck_job_reporting() {
        handles.push(start_stuck_job_reporter(
            app.job_store.clone(),
            every,
            threshold,
            &shutdown,
        ));
    }

    for handle in handles {
        if let Err(e) = handle.await {
            error!("💥 Job task ended abnormally: {}", e);
        }
    }

    info!("🛑 Job supervisor stopped");
}

fn start_workers(
    config: &WorkerConfig,
    app: &App,
    agent_factory: &Arc<dyn AgentFactory>,
    shutdown: &CancellationToken,
) -> Vec<JoinHandle<()>> {
    info!(
        "🚀 Starting {} worker(s), polling every {:?}",
        config.count,
        config.poll_interval()
    );

    (0..config.count)
        .map(|worker_id| {
            let worker = Worker::new(
                format!("worker-{worker_id}"),
                config.clone(),
                app.job_store.clone(),
                app.content_store.clone(),
                agent_factory.clone(),
            );
            let shutdown = shutdown.clone();

            spawn(async move { worker.run(shutdown).await })
        })
        .collect()
}

fn start_scheduler(
    config: &SchedulerConfig,
    app: &App,
    shutdown: &CancellationToken,
) -> JoinHandle<()> {
    let scheduler = Scheduler::new(
        config.clone(),
        app.job_store.clone(),
        app.content_store.clone(),
    );
    let shutdown = shutdown.clone();

    spawn(async move { scheduler.run(shutdown).await })
}

fn start_stuck_job_reporter(
    job_store: Arc<dyn JobStore>,
    every: Duration,
    threshold: Duration,
    shutdown: &CancellationToken,
) -> JoinHandle<()> {
    info!(
        "🏥 Reporting jobs running longer than {:?} every {:?}",
        threshold, every
    );

    let shutdown = shutdown.clone();

    spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            if let Err(e) = report_stuck_jobs(job_store.as_ref(), threshold).await {
                error!("❌ Failed to look for stuck jobs: {}", e);
            }
        }
    })
}

/// Log every job running for longer than `threshold`. Nothing is modified.
async fn report_stuck_jobs(
    job_store: &dyn JobStore,
    threshold: Duration,
) -> Result<usize, JobStoreError> {
    let stuck = job_store.stuck_jobs(threshold).await?;

    for job in &stuck {
        warn!(
            "🐌 {}({}) for brand '{}' has been running since {}; requeue it with `jobs requeue {}`",
            job.r#type, job.id, job.brand_id, job.updated_at, job.id
        );
    }

    Ok(stuck.len())
}
