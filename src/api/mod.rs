//! HTTP API module: collection reads, certificate proxy and frontend fallback.

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
