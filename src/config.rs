use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Connection string for the call-record store. Required; startup fails
    /// without it.
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Pool acquisition and query timeout. A stalled store must not pin a
    /// request handler indefinitely.
    #[serde(default = "default_acquire_timeout_seconds")]
    pub acquire_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackingConfig {
    /// Path prefixes the auto-tracking middleware must not re-log, so the
    /// stats and health endpoints stay out of their own statistics.
    #[serde(default = "default_excluded_paths")]
    pub excluded_paths: Vec<String>,
    /// Maximum request-body size the middleware will buffer for storage.
    #[serde(default = "default_max_logged_body_bytes")]
    pub max_logged_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_seconds() -> u64 {
    5
}

fn default_excluded_paths() -> Vec<String> {
    vec![
        "/track".to_string(),
        "/stats".to_string(),
        "/health".to_string(),
        "/docs".to_string(),
    ]
}

fn default_max_logged_body_bytes() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            acquire_timeout_seconds: default_acquire_timeout_seconds(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            excluded_paths: default_excluded_paths(),
            max_logged_body_bytes: default_max_logged_body_bytes(),
        }
    }
}

/// Load configuration from a TOML file (optional) layered under
/// `API_STATS__`-prefixed environment variables.
///
/// The bare `DATABASE_URL` variable is also honored and takes precedence,
/// matching the deployment contract this service has always had.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("API_STATS").separator("__"))
        .build()?;

    let mut cfg: Config = config.try_deserialize()?;

    if let Ok(url) = std::env::var("DATABASE_URL") {
        if !url.is_empty() {
            cfg.database.url = url;
        }
    }

    validate_config(&cfg)?;

    Ok(cfg)
}

fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.database.url.is_empty() {
        anyhow::bail!(
            "database.url is not set (provide DATABASE_URL or database.url in config.toml)"
        );
    }

    if cfg.database.max_connections == 0 {
        anyhow::bail!("database.max_connections must be at least 1");
    }

    Ok(())
}
