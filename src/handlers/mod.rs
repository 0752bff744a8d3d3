pub mod health;
pub mod stats;
pub mod track;

use std::sync::Arc;

use crate::config::Config;
use crate::store::StatsDb;

/// Shared state for all request handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<StatsDb>,
    pub config: Arc<Config>,
}
