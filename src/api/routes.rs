//! HTTP API route definitions.

use axum::{
    routing::{any, get},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::config::Config;

use super::handlers::{
    api_not_found, blogs, certificate, health, products, sensor_data, welcome, AppState,
};

/// Create the application router.
///
/// API routes live under `/api`; every other path is served from the
/// frontend build, falling back to the SPA entry document.
pub fn create_router(state: AppState) -> Router {
    let frontend = frontend_service(&state.config);

    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        // Collection reads
        .route("/api/Store", get(products))
        .route("/api/data", get(sensor_data))
        .route("/api/blogs", get(blogs))
        // Upstream proxy
        .route("/api/certificate", get(certificate))
        .route("/api", any(api_not_found))
        .route("/api/*rest", any(api_not_found))
        .fallback_service(frontend)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Static assets from `static_dir`, with the SPA entry for anything else.
fn frontend_service(config: &Config) -> ServeDir<ServeFile> {
    ServeDir::new(&config.static_dir).fallback(ServeFile::new(config.spa_index_path()))
}
