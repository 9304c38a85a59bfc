//! On-demand triggers that queue work for a brand right away.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

use crate::{
    app::App,
    content::ContentStoreError,
    database::models::job_type::JobType,
    jobs::job_store::JobStoreError,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct TriggerResponse {
    pub status: String,
    pub brand: String,
    pub job_id: i64,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    #[error("Brand {0} not found")]
    BrandNotFound(String),
    #[error("Failed to load brand: {0}")]
    ContentStore(#[from] ContentStoreError),
    #[error("Failed to enqueue job: {0}")]
    JobStore(#[from] JobStoreError),
}

impl IntoResponse for TriggerError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::BrandNotFound(_) => StatusCode::NOT_FOUND,
            Self::ContentStore(_) | Self::JobStore(_) => {
                error!("❌ Trigger failed: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub async fn run(
    State(app): State<App>,
    Path(brand_id): Path<String>,
) -> Result<(StatusCode, Json<TriggerResponse>), TriggerError> {
    trigger(&app, brand_id, JobType::Cycle, "Content cycle queued").await
}

pub async fn sync(
    State(app): State<App>,
    Path(brand_id): Path<String>,
) -> Result<(StatusCode, Json<TriggerResponse>), TriggerError> {
    trigger(&app, brand_id, JobType::Sync, "Analytics sync queued").await
}

async fn trigger(
    app: &App,
    brand_id: String,
    job_type: JobType,
    message: &str,
) -> Result<(StatusCode, Json<TriggerResponse>), TriggerError> {
    if app.content_store.find_brand(&brand_id).await?.is_none() {
        return Err(TriggerError::BrandNotFound(brand_id));
    }

    let job_id = app
        .job_store
        .enqueue(&brand_id, job_type, Duration::ZERO, "")
        .await?;

    info!("⚡ Triggered {job_type}({job_id}) for brand '{brand_id}'");

    Ok((
        StatusCode::ACCEPTED,
        Json(TriggerResponse {
            status: "accepted".to_string(),
            brand: brand_id,
            job_id,
            message: message.to_string(),
        }),
    ))
}
