//! Best-effort request auto-tracking
//!
//! Every inbound request whose path is not excluded gets logged as a call
//! record. The write is a non-critical side effect: it runs in a spawned
//! task, is never awaited by the request path, and its failure is logged
//! and discarded. Auto-tracking must never degrade the request it observes.
//!
//! The service's own endpoints are excluded by default so the stats do not
//! count themselves.

use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use std::net::SocketAddr;
use tracing::warn;

use crate::client_ip::client_ip;
use crate::handlers::AppState;
use crate::store::NewCall;

/// Middleware that logs non-excluded requests
pub async fn track_requests(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    req: Request,
    next: Next,
) -> Response {
    if is_excluded(req.uri().path(), &state.config.tracking.excluded_paths) {
        return next.run(req).await;
    }

    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let ip = client_ip(req.headers(), connect_info.map(|ConnectInfo(addr)| addr));

    let (req, request_body) =
        buffer_json_body(req, state.config.tracking.max_logged_body_bytes).await;

    let mut call = NewCall::new(path, method, ip);
    call.request_body = request_body;

    // Fire-and-forget: the error channel of this write is explicitly
    // discarded after logging.
    let db = state.db.clone();
    tokio::spawn(async move {
        if let Err(err) = db.record_call(&call).await {
            warn!(endpoint = %call.endpoint, error = %err, "Best-effort request log dropped");
        }
    });

    next.run(req).await
}

/// Exact path or prefix-with-slash match against the exclusion list, so
/// `/stats` also covers `/stats/last` without catching `/statistics`.
fn is_excluded(path: &str, excluded: &[String]) -> bool {
    excluded.iter().any(|prefix| {
        path == prefix
            || (path.starts_with(prefix.as_str())
                && path.as_bytes().get(prefix.len()) == Some(&b'/'))
    })
}

/// Buffer the request body when it is JSON and small enough to store.
///
/// Only bodies with an explicit Content-Length within the limit are read;
/// anything else passes through untouched with no body logged. The buffered
/// bytes are handed back to the inner handler unchanged.
async fn buffer_json_body(req: Request, limit: usize) -> (Request, Option<serde_json::Value>) {
    let is_json = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/json"))
        .unwrap_or(false);

    let declared_len = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());

    if !is_json || !matches!(declared_len, Some(len) if len <= limit) {
        return (req, None);
    }

    let (parts, body) = req.into_parts();
    match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => {
            let value = serde_json::from_slice(&bytes).ok();
            (Request::from_parts(parts, Body::from(bytes)), value)
        }
        Err(err) => {
            warn!(error = %err, "Failed to buffer request body for tracking");
            (Request::from_parts(parts, Body::empty()), None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn excluded() -> Vec<String> {
        vec!["/track".to_string(), "/stats".to_string(), "/health".to_string()]
    }

    #[test]
    fn test_exact_path_is_excluded() {
        assert!(is_excluded("/track", &excluded()));
        assert!(is_excluded("/health", &excluded()));
    }

    #[test]
    fn test_subpaths_of_excluded_prefix_are_excluded() {
        assert!(is_excluded("/stats/last", &excluded()));
        assert!(is_excluded("/stats/counts", &excluded()));
    }

    #[test]
    fn test_prefix_match_requires_path_boundary() {
        assert!(!is_excluded("/statistics", &excluded()));
        assert!(!is_excluded("/trackers/1", &excluded()));
    }

    #[test]
    fn test_other_paths_are_tracked() {
        assert!(!is_excluded("/api/users", &excluded()));
        assert!(!is_excluded("/", &excluded()));
    }
}
