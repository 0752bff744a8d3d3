use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One immutable row in the `api_calls` table
///
/// Rows are never updated or deleted once written. Endpoint keys are exact
/// strings with no normalization: `/api/users` and `/api/users/` are
/// distinct keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    pub id: i64,
    pub external_user_id: Option<i64>,
    pub endpoint: String,
    pub method: String,
    pub ip_address: String,
    pub request_body: Option<serde_json::Value>,
    pub status_code: i64,
    pub called_at: DateTime<Utc>,
}

/// A call record as submitted to the recorder, before the store assigns an
/// id and the recorder stamps `called_at`.
#[derive(Debug, Clone)]
pub struct NewCall {
    pub endpoint: String,
    pub method: String,
    pub ip_address: String,
    pub external_user_id: Option<i64>,
    pub request_body: Option<serde_json::Value>,
    pub status_code: i64,
}

impl NewCall {
    /// A new call record with the default reported outcome (200) and no
    /// caller-supplied extras.
    pub fn new(
        endpoint: impl Into<String>,
        method: impl Into<String>,
        ip_address: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: method.into(),
            ip_address: ip_address.into(),
            external_user_id: None,
            request_body: None,
            status_code: 200,
        }
    }
}

/// Aggregate count for a single endpoint key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointCount {
    pub endpoint: String,
    pub count: i64,
}
