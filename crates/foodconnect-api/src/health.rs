use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use tracing::warn;

use crate::state::{AppState, blocking};

/// Always 200; the body reports whether the database answered.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = match blocking(&state, |s| s.db.ping()).await {
        Ok(()) => "Connected",
        Err(e) => {
            warn!("Health check could not reach the database: {:#}", e);
            "Disconnected"
        }
    };

    Json(json!({
        "status": "OK",
        "message": "FoodConnect API is running",
        "database": database,
    }))
}
