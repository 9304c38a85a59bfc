pub mod health_checks;
pub mod triggers;

use axum::{routing::post, Router};

use crate::app::App;

/// Routes mounted under `/api`.
pub fn router() -> Router<App> {
    Router::new()
        .route("/brands/{brand_id}/run", post(triggers::run))
        .route("/brands/{brand_id}/sync", post(triggers::sync))
}
