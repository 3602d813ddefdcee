//! Local stand-in for the certificate API, used by tests.

use std::collections::HashMap;

use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

/// Number for which the stub answers 503.
pub const FAILING_NUMBER: &str = "FAIL-503";
/// Number for which the stub answers with a non-JSON body.
pub const GARBAGE_NUMBER: &str = "GARBAGE";
/// Number for which the stub answers with a single JSON object.
pub const OBJECT_NUMBER: &str = "CERT-OBJ 7";

async fn search(Query(params): Query<HashMap<String, String>>) -> Response {
    let number = params
        .iter()
        .find(|(key, _)| key.as_str() != "sheet")
        .map(|(_, value)| value.clone())
        .unwrap_or_default();

    match number.as_str() {
        FAILING_NUMBER => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        GARBAGE_NUMBER => "<html>not json</html>".into_response(),
        OBJECT_NUMBER => Json(json!({
            "certificate": number,
            "status": "valid",
            "issued": {"year": 2021, "by": "Registry"},
        }))
        .into_response(),
        _ => {
            let mut row: Map<String, Value> = params
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect();
            row.insert("holder".to_string(), Value::String("Jane Doe".to_string()));
            Json(Value::Array(vec![Value::Object(row)])).into_response()
        }
    }
}

/// Start the stub on an ephemeral port and return its API base URL.
pub async fn spawn_upstream() -> String {
    let app = Router::new().route("/api/v1/abc123/search", get(search));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/api/v1/abc123", addr)
}
