//! Read-only statistics endpoints
//!
//! Each handler runs one aggregate query. An empty table is a valid 200
//! with a "no data" message; only a store fault becomes a 500.

use axum::extract::State;
use axum::response::{IntoResponse, Json, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use super::AppState;
use crate::error::AppError;
use crate::store::EndpointCount;

#[derive(Debug, Serialize)]
pub struct CallInfo {
    pub endpoint: String,
    pub method: String,
    pub ip_address: String,
    pub called_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct LastCalledResponse {
    pub last_called: CallInfo,
}

#[derive(Debug, Serialize)]
pub struct MostFrequentResponse {
    pub most_frequent: EndpointCount,
}

#[derive(Debug, Serialize)]
pub struct CountsResponse {
    pub counts: Vec<EndpointCount>,
}

fn no_data() -> Response {
    Json(json!({ "message": "No calls recorded yet" })).into_response()
}

/// GET /stats/last - the most recently recorded call
pub async fn last_called(State(state): State<AppState>) -> Result<Response, AppError> {
    match state.db.last_called().await? {
        Some(record) => Ok(Json(LastCalledResponse {
            last_called: CallInfo {
                endpoint: record.endpoint,
                method: record.method,
                ip_address: record.ip_address,
                called_at: record.called_at,
                user_id: record.external_user_id,
            },
        })
        .into_response()),
        None => Ok(no_data()),
    }
}

/// GET /stats/most - the endpoint with the largest call count
pub async fn most_frequent(State(state): State<AppState>) -> Result<Response, AppError> {
    match state.db.most_frequent().await? {
        Some(most_frequent) => Ok(Json(MostFrequentResponse { most_frequent }).into_response()),
        None => Ok(no_data()),
    }
}

/// GET /stats/counts - call counts for every endpoint, descending
pub async fn counts(State(state): State<AppState>) -> Result<Json<CountsResponse>, AppError> {
    let counts = state.db.endpoint_counts().await?;
    Ok(Json(CountsResponse { counts }))
}
