use thiserror::Error;

/// Errors surfaced by store operations
///
/// All sqlx-level faults are classified here so callers can distinguish
/// "the store is unreachable" from "the store rejected the operation"
/// without ever seeing a raw driver error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required field was missing or empty; the store was never contacted
    #[error("validation error: {0}")]
    Validation(String),

    /// A connection to the backing store could not be established or acquired
    #[error("store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    /// The store rejected a write after the connection succeeded
    #[error("write failed: {0}")]
    WriteFailed(#[source] sqlx::Error),

    /// The store rejected a read after the connection succeeded
    #[error("read failed: {0}")]
    ReadFailed(#[source] sqlx::Error),
}

/// Connection-level faults count as unavailability; anything past the
/// connection is a write failure.
pub(crate) fn classify_write(err: sqlx::Error) -> StoreError {
    match err {
        e @ (sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Configuration(_)) => StoreError::Unavailable(e),
        e => StoreError::WriteFailed(e),
    }
}

pub(crate) fn classify_read(err: sqlx::Error) -> StoreError {
    match err {
        e @ (sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Configuration(_)) => StoreError::Unavailable(e),
        e => StoreError::ReadFailed(e),
    }
}
