//! HTTP API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::certificate::CertificateClient;
use crate::config::Config;
use crate::error::{ApiError, GatewayError};
use crate::metrics;
use crate::store::{fetch_collection, Document, MongoConnector, Resource, StoreConnector};

/// Request header carrying the shared secret.
pub const SECRET_HEADER: &str = "serv";

/// Text served at `/`.
pub const WELCOME_MESSAGE: &str = "Welcome to the Blog API!";

/// Application state shared with handlers. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    /// Process configuration.
    pub config: Arc<Config>,
    /// Opens a fresh store connection per request.
    pub store: Arc<dyn StoreConnector>,
    /// Certificate API client.
    pub certificates: CertificateClient,
}

impl AppState {
    /// Create app state with an explicit store connector.
    pub fn new(config: Config, store: Arc<dyn StoreConnector>) -> Result<Self, GatewayError> {
        let certificates = CertificateClient::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            store,
            certificates,
        })
    }

    /// Create app state backed by MongoDB at `config.mongodb_url`.
    pub fn from_config(config: Config) -> Result<Self, GatewayError> {
        let store = Arc::new(MongoConnector::new(config.mongodb_url.clone()));
        Self::new(config, store)
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Query string of `/api/certificate`.
#[derive(Debug, Deserialize)]
pub struct CertificateQuery {
    /// Certificate number to look up.
    pub number: Option<String>,
}

/// Check the shared-secret header by exact string equality.
pub fn authorize(headers: &HeaderMap, secret: &str) -> Result<(), ApiError> {
    match headers.get(SECRET_HEADER).map(|v| v.to_str()) {
        Some(Ok(provided)) if provided == secret => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}

/// Welcome handler - static text.
pub async fn welcome() -> &'static str {
    WELCOME_MESSAGE
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

async fn read_collection(
    state: &AppState,
    headers: &HeaderMap,
    resource: Resource,
    endpoint: &'static str,
) -> Result<Json<Vec<Document>>, ApiError> {
    metrics::inc_requests(endpoint);

    if let Err(e) = authorize(headers, &state.config.serv) {
        warn!(endpoint, "Rejected request with missing or wrong secret");
        metrics::inc_auth_rejected(endpoint);
        return Err(e);
    }

    let documents = fetch_collection(Arc::clone(&state.store), resource).await?;
    Ok(Json(documents))
}

/// `GET /api/Store` - every product document.
pub async fn products(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Document>>, ApiError> {
    read_collection(&state, &headers, Resource::Products, "products").await
}

/// `GET /api/data` - every sensor document.
pub async fn sensor_data(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Document>>, ApiError> {
    read_collection(&state, &headers, Resource::SensorData, "sensor_data").await
}

/// `GET /api/blogs` - every blog document.
pub async fn blogs(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Document>>, ApiError> {
    read_collection(&state, &headers, Resource::Blogs, "blogs").await
}

/// `GET /api/certificate?number=` - relay the certificate API response.
pub async fn certificate(
    State(state): State<AppState>,
    Query(query): Query<CertificateQuery>,
) -> Result<Json<Value>, ApiError> {
    metrics::inc_requests("certificate");

    let number = match query.number {
        Some(n) if !n.is_empty() => n,
        _ => {
            return Err(ApiError::Validation(
                "Certificate number is required".to_string(),
            ))
        }
    };

    debug!(number = %number, "Looking up certificate");
    let value = state.certificates.lookup(&number).await?;
    Ok(Json(value))
}

/// Unknown path under `/api`.
pub async fn api_not_found() -> ApiError {
    ApiError::NotFound
}
