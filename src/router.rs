use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::{api, api::health_checks, app::App};

pub fn router(app: App) -> Router {
    Router::new()
        .route("/liveness", get(health_checks::ok))
        .route("/readiness", get(health_checks::ready))
        .nest("/api", api::router())
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}
