use axum::extract::State;
use axum::response::{IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

use super::AppState;
use crate::error::AppError;

/// Health check endpoint
///
/// Probes the database with a trivial round trip. Returns 200 with the
/// current timestamp when the store answers, 503 otherwise.
pub async fn health_check(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    if state.db.check_health().await {
        Ok(Json(json!({
            "status": "healthy",
            "database": "connected",
            "timestamp": Utc::now(),
        })))
    } else {
        Err(AppError::Unhealthy("Database connection failed".to_string()))
    }
}
