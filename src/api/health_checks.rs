use axum::extract::State;

use crate::app::{App, ReadinessError};

pub async fn ok() -> &'static str {
    "OK"
}

/// Ready once the database answers.
pub async fn ready(State(app): State<App>) -> Result<&'static str, ReadinessError> {
    app.db.ping().await?;
    Ok("OK")
}
