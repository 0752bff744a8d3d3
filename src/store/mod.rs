//! Call-record store for the API stats service
//!
//! This module owns the single `api_calls` table and its consistency
//! contract:
//! - **Recorder**: validates and persists one immutable row per observed call
//! - **Reader**: computes aggregates (last call, most frequent, full counts)
//! - **Health**: a trivial round-trip probe for the liveness endpoint
//!
//! Every operation performs one scoped round trip to the store. Connections
//! come from the pool immediately before use and are returned on every exit
//! path; no operation holds a connection or transaction across round trips.
//! Store faults never escape as raw errors: they are translated into
//! [`StoreError`] at this boundary.

pub mod database;
pub mod error;
pub mod reader;
pub mod record;
pub mod recorder;

pub use database::StatsDb;
pub use error::StoreError;
pub use record::{CallRecord, EndpointCount, NewCall};
