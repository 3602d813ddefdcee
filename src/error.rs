//! Unified error types for the gateway.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Startup and process-level errors.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP client construction error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Metrics exporter error.
    #[error("metrics error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Document store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Could not open a connection to the store.
    #[error("failed to connect to document store: {0}")]
    Connect(String),

    /// The collection query failed.
    #[error("query on {database}.{collection} failed: {reason}")]
    Query {
        /// Logical database name.
        database: String,
        /// Collection name.
        collection: String,
        /// Reason for failure.
        reason: String,
    },

    /// The task running the fetch panicked or was cancelled.
    #[error("store task failed: {0}")]
    Task(String),
}

/// Certificate lookup API errors.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// A required setting for the lookup API is missing.
    #[error("certificate API not configured: {0} is missing")]
    NotConfigured(&'static str),

    /// The configured base URL cannot carry a path.
    #[error("invalid certificate API base url: {0}")]
    InvalidBase(String),

    /// URL parsing failed.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// HTTP request failed.
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("upstream returned HTTP {status}")]
    Status {
        /// Status code returned by the upstream.
        status: u16,
    },

    /// Upstream body was not valid JSON.
    #[error("failed to parse upstream response: {0}")]
    Parse(String),
}

/// Errors surfaced to HTTP clients.
///
/// Store and upstream failures are logged in full when converted into a
/// response; the client only sees a generic message.
#[derive(Error, Debug)]
pub enum ApiError {
    /// `serv` header missing or wrong.
    #[error("Unauthorized")]
    Unauthorized,

    /// Required input missing.
    #[error("{0}")]
    Validation(String),

    /// Document store failure.
    #[error("store failure: {0}")]
    Store(#[from] StoreError),

    /// Certificate API failure.
    #[error("upstream failure: {0}")]
    Upstream(#[from] UpstreamError),

    /// Unknown API path.
    #[error("Not Found")]
    NotFound,
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) | ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Message placed in the `error` field of the response body.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Store(_) => "Internal Server Error".to_string(),
            ApiError::Upstream(_) => "Failed to fetch certificate data".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Store(e) => {
                error!(error = %e, "document store request failed");
                crate::metrics::inc_store_failures();
            }
            ApiError::Upstream(e) => {
                error!(error = %e, "certificate lookup failed");
                crate::metrics::inc_upstream_failures();
            }
            _ => {}
        }

        (self.status(), Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, GatewayError>;
