//! Integration tests for the blog API gateway.
//!
//! Most tests run the real router on a local port against the in-memory
//! store. Tests marked `#[ignore]` need a reachable MongoDB in `MONGODB_URL`.
//! Run them with: cargo test --test integration -- --ignored

use std::net::SocketAddr;
use std::sync::Arc;

use blog_api::api::{create_router, AppState};
use blog_api::config::Config;
use blog_api::store::{
    fetch_collection, Document, MockConfig, MockStore, MongoConnector, Resource, StoreConnector,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::net::TcpListener;

const SECRET: &str = "secret123";

/// Serve the gateway on an ephemeral port.
async fn spawn_gateway(store: MockStore) -> SocketAddr {
    let mut config = Config::new(SECRET, "mongodb://localhost:27017");
    config.static_dir = "does-not-exist".to_string();

    let state = AppState::new(config, Arc::new(store)).expect("state");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, create_router(state)).await.expect("serve");
    });

    addr
}

fn document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

#[tokio::test]
async fn store_scenario_over_tcp() {
    let store = MockStore::new();
    store.insert(
        "Store",
        "Products",
        vec![document(json!({"_id": "1", "name": "Widget"}))],
    );
    let addr = spawn_gateway(store.clone()).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{addr}/api/Store"))
        .header("serv", SECRET)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!([{"_id": "1", "name": "Widget"}]));

    let response = client
        .get(format!("http://{addr}/api/Store"))
        .header("serv", "wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"error": "Unauthorized"}));

    assert_eq!(store.connect_attempts(), 1);
    assert_eq!(store.open_connections(), 0);
}

#[tokio::test]
async fn concurrent_requests_each_get_their_own_connection() {
    let store = MockStore::new();
    store.insert(
        "Blog",
        "Blogs",
        vec![
            document(json!({"_id": "a", "title": "First"})),
            document(json!({"_id": "b", "title": "Second"})),
        ],
    );
    let addr = spawn_gateway(store.clone()).await;
    let client = reqwest::Client::new();

    let requests = (0..8).map(|_| {
        let client = client.clone();
        async move {
            client
                .get(format!("http://{addr}/api/blogs"))
                .header("serv", SECRET)
                .send()
                .await
                .unwrap()
                .json::<Vec<Value>>()
                .await
                .unwrap()
        }
    });

    let results = futures::future::join_all(requests).await;
    assert!(results.iter().all(|docs| docs.len() == 2));
    assert_eq!(store.connects(), 8);
    assert_eq!(store.closes(), 8);
}

#[tokio::test]
async fn failing_store_does_not_leak_connections() {
    let store = MockStore::with_config(MockConfig {
        fail_query: true,
        ..Default::default()
    });
    let addr = spawn_gateway(store.clone()).await;
    let client = reqwest::Client::new();

    for _ in 0..10 {
        let response = client
            .get(format!("http://{addr}/api/data"))
            .header("serv", SECRET)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 500);
    }

    assert_eq!(store.connects(), 10);
    assert_eq!(store.open_connections(), 0);

    // A failed request does not affect the next one.
    let response = client
        .get(format!("http://{addr}/api/certificate"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn client_disconnect_mid_query_releases_connection() {
    let store = MockStore::with_config(MockConfig {
        query_delay_ms: 300,
        ..Default::default()
    });
    let addr = spawn_gateway(store.clone()).await;

    let result = reqwest::Client::new()
        .get(format!("http://{addr}/api/blogs"))
        .header("serv", SECRET)
        .timeout(std::time::Duration::from_millis(50))
        .send()
        .await;
    assert!(result.is_err(), "request should time out client-side");

    tokio::time::sleep(std::time::Duration::from_millis(600)).await;
    assert_eq!(store.connects(), 1);
    assert_eq!(store.closes(), 1);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let addr = spawn_gateway(MockStore::new()).await;

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/"))
        .header("origin", "http://frontend.example")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

/// Test reading every collection from a live MongoDB.
#[tokio::test]
#[ignore = "requires MONGODB_URL"]
async fn test_fetch_from_live_store() {
    dotenvy::dotenv().ok();
    let uri = match std::env::var("MONGODB_URL") {
        Ok(uri) => uri,
        Err(_) => {
            println!("Skipping: MONGODB_URL not set");
            return;
        }
    };

    let connector: Arc<dyn StoreConnector> = Arc::new(MongoConnector::new(uri));
    for resource in [Resource::Products, Resource::SensorData, Resource::Blogs] {
        let result = fetch_collection(Arc::clone(&connector), resource).await;
        assert!(result.is_ok(), "Failed to read {}: {:?}", resource, result.err());
        println!("{}: {} documents", resource, result.unwrap().len());
    }
}

/// Test that an unreachable store surfaces a connect error.
#[tokio::test]
async fn test_unreachable_store_fails_to_connect() {
    let connector = MongoConnector::new("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=500");
    let result = fetch_collection(Arc::new(connector), Resource::Blogs).await;
    assert!(result.is_err());
}
