use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{config::Config, handlers, handlers::AppState, store::StatsDb, tracking};

/// Start the API stats server
///
/// This function:
/// 1. Connects to the call-record database and runs migrations
/// 2. Creates the Axum application
/// 3. Binds to the configured address
/// 4. Serves requests with graceful shutdown support
pub async fn start_server(config: Config) -> Result<()> {
    let db = Arc::new(StatsDb::new(&config.database).await?);
    let config = Arc::new(config);

    let state = AppState {
        db,
        config: config.clone(),
    };

    let app = create_router(state);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting API Stats Service on {}", addr);
    info!(
        "Auto-tracking exclusions: {}",
        config.tracking.excluded_paths.join(", ")
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // ConnectInfo gives handlers the peer address for X-Forwarded-For fallback
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Create the Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/track", post(handlers::track::track_call))
        .route("/stats/last", get(handlers::stats::last_called))
        .route("/stats/most", get(handlers::stats::most_frequent))
        .route("/stats/counts", get(handlers::stats::counts))
        .route("/health", get(handlers::health::health_check))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            tracking::track_requests,
        ))
        .with_state(state)
        // Limit request body size to 1MB; stored bodies are capped far lower
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Resolve on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to setup SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to setup SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections...");
}
