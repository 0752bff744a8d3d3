//! Write path for call records
//!
//! One row per logged call attempt. Rows are immutable once written; there
//! is no update or delete path.

use chrono::Utc;

use super::database::StatsDb;
use super::error::{classify_write, StoreError};
use super::record::NewCall;

impl StatsDb {
    /// Persist one call record
    ///
    /// `called_at` is stamped here with the current wall-clock time, never
    /// taken from the caller. The insert runs in its own transaction: on any
    /// failure the transaction is rolled back before the connection goes
    /// back to the pool, so a partial write never persists. No retry is
    /// performed; the caller decides whether a failed log is user-visible.
    pub async fn record_call(&self, call: &NewCall) -> Result<(), StoreError> {
        if call.endpoint.is_empty() {
            // Validation failures never touch the pool
            return Err(StoreError::Validation(
                "endpoint must not be empty".to_string(),
            ));
        }

        let request_body = call
            .request_body
            .as_ref()
            .map(|body| body.to_string());

        let mut tx = self.pool().begin().await.map_err(classify_write)?;

        let result = sqlx::query(
            "INSERT INTO api_calls (external_user_id, endpoint, method, ip_address, request_body, status_code, called_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(call.external_user_id)
        .bind(&call.endpoint)
        .bind(&call.method)
        .bind(&call.ip_address)
        .bind(&request_body)
        .bind(call.status_code)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => tx.commit().await.map_err(classify_write),
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "Rollback after failed insert also failed");
                }
                Err(classify_write(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::database::test_support::create_test_db;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_record_then_last_called_round_trip() {
        let (db, _dir) = create_test_db().await;
        let before = Utc::now();

        let mut call = NewCall::new("/api/users", "POST", "203.0.113.5");
        call.external_user_id = Some(7);
        call.request_body = Some(json!({"calledService": "/api/users", "id": 7}));
        db.record_call(&call).await.unwrap();

        let last = db.last_called().await.unwrap().expect("one row recorded");
        assert_eq!(last.endpoint, "/api/users");
        assert_eq!(last.method, "POST");
        assert_eq!(last.ip_address, "203.0.113.5");
        assert_eq!(last.external_user_id, Some(7));
        assert_eq!(last.status_code, 200);
        assert!(last.called_at >= before);
        assert_eq!(
            last.request_body,
            Some(json!({"calledService": "/api/users", "id": 7}))
        );
    }

    #[tokio::test]
    async fn test_empty_endpoint_never_contacts_the_store() {
        let (db, _dir) = create_test_db().await;
        // A closed pool would turn any store access into Unavailable, so a
        // Validation result proves the pool was never touched.
        db.close().await;

        let call = NewCall::new("", "POST", "203.0.113.5");
        let err = db.record_call(&call).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_record_after_close_is_unavailable() {
        let (db, _dir) = create_test_db().await;
        db.close().await;

        let call = NewCall::new("/api/users", "POST", "203.0.113.5");
        let err = db.record_call(&call).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_concurrent_records_both_persist() {
        let (db, _dir) = create_test_db().await;

        let call_a = NewCall::new("/a", "GET", "10.0.0.1");
        let call_b = NewCall::new("/b", "GET", "10.0.0.2");
        let a = db.record_call(&call_a);
        let b = db.record_call(&call_b);
        let (ra, rb) = tokio::join!(a, b);
        ra.unwrap();
        rb.unwrap();

        let counts = db.endpoint_counts().await.unwrap();
        assert_eq!(counts.len(), 2);
        assert!(counts.iter().all(|c| c.count == 1));
    }
}
