//! JSON HTTP API for the chart-of-accounts viewer
//!
//! Routes are organized into modules:
//! - routes::entities: entity list, anomalies, reload
//! - routes::accounts: account list, tree rows, toggle, collapse
//! - routes::budget: budget vs realisasi

pub mod error;
pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use coaweb_config::Config;
use coaweb_core::AccountBook;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::{ApiError, ApiResult};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub book: Arc<AccountBook>,
    pub config: Config,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::accounts::{api_accounts, api_collapse, api_toggle, api_tree};
    use routes::budget::api_variance;
    use routes::entities::{api_anomalies, api_entities, api_reload};

    let cors_enable = state.config.server.cors_enable;

    let router = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/entities", get(api_entities))
        .route("/api/entities/:entity/accounts", get(api_accounts))
        .route("/api/entities/:entity/tree", get(api_tree))
        .route("/api/entities/:entity/tree/toggle/:id", post(api_toggle))
        .route("/api/entities/:entity/tree/collapse", post(api_collapse))
        .route("/api/entities/:entity/variance", get(api_variance))
        .route("/api/entities/:entity/anomalies", get(api_anomalies))
        .route("/api/reload", post(api_reload))
        .with_state(state);

    if cors_enable {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Bind and serve until the process is stopped
pub async fn start_server(config: Config, book: Arc<AccountBook>) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState { book, config };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting coaweb server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - /api/entities (Entity list)");
    log::info!("  - /api/entities/:entity/tree (Account tree)");
    log::info!("  - /api/entities/:entity/variance (Budget vs realisasi)");

    axum::serve(listener, router).await?;
    log::info!("Server stopped gracefully");
    Ok(())
}
