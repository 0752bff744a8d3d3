//! Explicit call-tracking endpoint
//!
//! `POST /track` accepts a report of a call made to some other service and
//! persists it. Unlike the auto-tracking middleware, a failed write here is
//! user-visible: the caller asked for the log and gets a 500 if it fails.

use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json};
use serde::Serialize;
use std::net::SocketAddr;

use super::AppState;
use crate::client_ip::client_ip;
use crate::error::AppError;
use crate::store::NewCall;

#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub message: String,
    pub ip: String,
}

/// POST /track - log one call to the named service
///
/// Body: `{ "calledService": "/api/users", "id": 7 }` where `calledService`
/// is required and `id` is an optional external user identifier. The full
/// body is stored verbatim for audit.
pub async fn track_call(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, AppError> {
    let endpoint = body
        .get("calledService")
        .and_then(|value| value.as_str())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Validation("calledService field is required".to_string()))?
        .to_string();

    let ip = client_ip(&headers, Some(peer));

    let mut call = NewCall::new(endpoint.clone(), "POST", ip.clone());
    call.external_user_id = body.get("id").and_then(|value| value.as_i64());
    call.request_body = Some(body);

    state.db.record_call(&call).await?;

    Ok((
        StatusCode::CREATED,
        Json(TrackResponse {
            message: format!("Logged call to {}", endpoint),
            ip,
        }),
    ))
}
