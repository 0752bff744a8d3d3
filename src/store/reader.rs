//! Read path: aggregate queries over stored call records
//!
//! The three reads are independent; each runs on its own pooled connection
//! with no shared transaction, so each reflects store state at the moment it
//! executes. An empty table is a valid result, not an error; only store
//! faults surface as [`StoreError`].

use chrono::{DateTime, Utc};
use sqlx::Row;

use super::database::StatsDb;
use super::error::{classify_read, StoreError};
use super::record::{CallRecord, EndpointCount};

impl StatsDb {
    /// The single most recently recorded call, or `None` when no calls have
    /// been recorded yet.
    ///
    /// Ordering is by `called_at` descending; ties are broken in
    /// store-defined order, since sub-record timestamp precision is assumed
    /// sufficient but not guaranteed unique.
    pub async fn last_called(&self) -> Result<Option<CallRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT id, external_user_id, endpoint, method, ip_address, request_body, status_code, called_at
             FROM api_calls
             ORDER BY called_at DESC
             LIMIT 1",
        )
        .fetch_optional(self.pool())
        .await
        .map_err(classify_read)?;

        Ok(row.map(|row| CallRecord {
            id: row.get("id"),
            external_user_id: row.get("external_user_id"),
            endpoint: row.get("endpoint"),
            method: row.get("method"),
            ip_address: row.get("ip_address"),
            request_body: row
                .get::<Option<String>, _>("request_body")
                .and_then(|body| serde_json::from_str(&body).ok()),
            status_code: row.get("status_code"),
            called_at: row.get::<DateTime<Utc>, _>("called_at"),
        }))
    }

    /// The endpoint with the largest call count, or `None` on an empty
    /// table. Ties are broken in store-defined order; which endpoint wins
    /// when two have equal counts is non-deterministic.
    pub async fn most_frequent(&self) -> Result<Option<EndpointCount>, StoreError> {
        let row = sqlx::query(
            "SELECT endpoint, COUNT(*) as count
             FROM api_calls
             GROUP BY endpoint
             ORDER BY count DESC
             LIMIT 1",
        )
        .fetch_optional(self.pool())
        .await
        .map_err(classify_read)?;

        Ok(row.map(|row| EndpointCount {
            endpoint: row.get("endpoint"),
            count: row.get("count"),
        }))
    }

    /// Call counts for every endpoint key, descending by count. An empty
    /// table yields an empty vec.
    pub async fn endpoint_counts(&self) -> Result<Vec<EndpointCount>, StoreError> {
        let rows = sqlx::query(
            "SELECT endpoint, COUNT(*) as count
             FROM api_calls
             GROUP BY endpoint
             ORDER BY count DESC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(classify_read)?;

        Ok(rows
            .into_iter()
            .map(|row| EndpointCount {
                endpoint: row.get("endpoint"),
                count: row.get("count"),
            })
            .collect())
    }
}
