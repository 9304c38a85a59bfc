use std::{net::SocketAddr, sync::Arc};

use axum::{routing::get, Router};
use tokio::{net::TcpListener, signal};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    agent::AgentFactory,
    api::health_checks::ok,
    app::App,
    config::Config,
    database::setup_database,
    environment::Environment,
    jobs::job_supervisor::job_supervisor,
    router::router,
};

pub async fn handle_serve_command(
    environment: Environment,
    config: Config,
    agent_factory: fn(&App) -> Arc<dyn AgentFactory>,
) {
    let port = config.server.port;

    // Answer liveness probes while migrations run
    let liveness_server_task = tokio::spawn(start_liveness_server(port));

    let (db, migration_receiver) = match setup_database(&config.database).await {
        Ok(setup) => setup,
        Err(e) => {
            error!("❌ Could not connect to the database: {}", e);
            liveness_server_task.abort();
            return;
        }
    };

    match migration_receiver.await {
        Ok(Ok(())) => {
            info!("✅ Database is ready!");
        }
        Ok(Err(e)) => {
            error!("❌ Database setup failed: {}", e);
            liveness_server_task.abort();
            return;
        }
        Err(_) => {
            error!("❌ Database setup channel closed unexpectedly");
            liveness_server_task.abort();
            return;
        }
    }

    let app = App::new(config.clone(), environment, db);
    let shutdown = CancellationToken::new();

    let supervisor = tokio::spawn(job_supervisor(
        config.jobs,
        app.clone(),
        agent_factory(&app),
        shutdown.clone(),
    ));

    tokio::spawn(cancel_on_ctrl_c(shutdown.clone()));

    liveness_server_task.abort();
    let _ = liveness_server_task.await;

    if let Err(e) = start_server(router(app), port, shutdown.clone()).await {
        error!("❌ Server error: {}", e);
        shutdown.cancel();
    }

    // Workers finish the job they hold before stopping
    if let Err(e) = supervisor.await {
        error!("💥 Job supervisor ended abnormally: {}", e);
    }

    info!("👋 Shut down");
}

async fn cancel_on_ctrl_c(shutdown: CancellationToken) {
    if let Err(e) = signal::ctrl_c().await {
        error!("❌ Could not listen for Ctrl-C: {}", e);
        return;
    }

    info!("🛑 Shutdown requested, finishing in-flight work");
    shutdown.cancel();
}

// Minimal server that only serves liveness endpoint during migrations
async fn start_liveness_server(port: u16) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let result = match TcpListener::bind(addr).await {
        Ok(listener) => {
            let migration_router = Router::new().route("/liveness", get(ok));
            axum::serve(listener, migration_router).await
        }
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!("❌ Liveness server on {} failed: {}", addr, e);
    }
}

async fn start_server(
    router: Router,
    port: u16,
    shutdown: CancellationToken,
) -> Result<(), std::io::Error> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    info!("🌐 Server starting on http://{}", addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown.cancelled_owned())
    .await
}
