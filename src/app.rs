use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DatabaseConnection;
use thiserror::Error;

use crate::{
    config::Config,
    content::{ContentStore, DatabaseContentStore},
    environment::Environment,
    jobs::job_store::{DatabaseJobStore, JobStore},
};

/// Shared state handed to the HTTP handlers and the job supervisor.
#[derive(Clone)]
pub struct App {
    pub config: Config,
    pub environment: Environment,
    pub db: DatabaseConnection,
    pub job_store: Arc<dyn JobStore>,
    pub content_store: Arc<dyn ContentStore>,
}

impl App {
    #[must_use]
    pub fn new(config: Config, environment: Environment, db: DatabaseConnection) -> Self {
        let job_store = Arc::new(DatabaseJobStore::new(
            db.clone(),
            config.jobs.worker.retry_backoff(),
        ));
        let content_store = Arc::new(DatabaseContentStore::new(db.clone()));

        Self {
            config,
            environment,
            db,
            job_store,
            content_store,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReadinessError {
    #[error("Database connection error")]
    DatabaseError(#[from] sea_orm::DbErr),
}

impl IntoResponse for ReadinessError {
    fn into_response(self) -> Response {
        (StatusCode::SERVICE_UNAVAILABLE, self.to_string()).into_response()
    }
}
