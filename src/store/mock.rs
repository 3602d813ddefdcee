//! In-memory document store for testing.
//!
//! Records every connect, close and query so tests can verify that
//! connections are released and that rejected requests never reach the store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::StoreError;

use super::{Document, StoreConnection, StoreConnector};

type Collections = HashMap<(String, String), Vec<Document>>;

/// Configuration for mock store behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Whether connecting fails.
    pub fail_connect: bool,
    /// Whether queries fail after a successful connect.
    pub fail_query: bool,
    /// Simulated query latency in milliseconds.
    pub query_delay_ms: u64,
}

#[derive(Debug, Default)]
struct Counters {
    connect_attempts: AtomicUsize,
    connects: AtomicUsize,
    closes: AtomicUsize,
    queries: Mutex<Vec<(String, String)>>,
}

/// Mock document store.
#[derive(Debug, Clone, Default)]
pub struct MockStore {
    config: MockConfig,
    collections: Arc<Mutex<Collections>>,
    counters: Arc<Counters>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockStore {
    /// Create an empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock store with custom failure behavior.
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Replace the contents of `database.collection`.
    pub fn insert(&self, database: &str, collection: &str, documents: Vec<Document>) {
        lock(&self.collections).insert((database.to_string(), collection.to_string()), documents);
    }

    /// Number of connect calls, successful or not.
    pub fn connect_attempts(&self) -> usize {
        self.counters.connect_attempts.load(Ordering::SeqCst)
    }

    /// Number of connections successfully opened.
    pub fn connects(&self) -> usize {
        self.counters.connects.load(Ordering::SeqCst)
    }

    /// Number of connections closed.
    pub fn closes(&self) -> usize {
        self.counters.closes.load(Ordering::SeqCst)
    }

    /// Connections opened but not yet closed.
    pub fn open_connections(&self) -> usize {
        self.connects().saturating_sub(self.closes())
    }

    /// Every (database, collection) queried so far, in order.
    pub fn queries(&self) -> Vec<(String, String)> {
        lock(&self.counters.queries).clone()
    }
}

#[async_trait]
impl StoreConnector for MockStore {
    async fn connect(&self) -> Result<Box<dyn StoreConnection>, StoreError> {
        self.counters.connect_attempts.fetch_add(1, Ordering::SeqCst);

        if self.config.fail_connect {
            return Err(StoreError::Connect("mock connect failure".to_string()));
        }

        self.counters.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockConnection {
            store: self.clone(),
        }))
    }
}

struct MockConnection {
    store: MockStore,
}

#[async_trait]
impl StoreConnection for MockConnection {
    async fn find_all(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<Vec<Document>, StoreError> {
        if self.store.config.query_delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(
                self.store.config.query_delay_ms,
            ))
            .await;
        }

        lock(&self.store.counters.queries).push((database.to_string(), collection.to_string()));

        if self.store.config.fail_query {
            return Err(StoreError::Query {
                database: database.to_string(),
                collection: collection.to_string(),
                reason: "mock query failure".to_string(),
            });
        }

        let collections = lock(&self.store.collections);
        Ok(collections
            .get(&(database.to_string(), collection.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn close(self: Box<Self>) {
        self.store.counters.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn mock_store_returns_inserted_documents() {
        let store = MockStore::new();
        let mut widget = Document::new();
        widget.insert("name".to_string(), json!("Widget"));
        store.insert("Store", "Products", vec![widget.clone()]);

        let connection = store.connect().await.unwrap();
        let docs = connection.find_all("Store", "Products").await.unwrap();
        connection.close().await;

        assert_eq!(docs, vec![widget]);
        assert_eq!(store.open_connections(), 0);
    }

    #[tokio::test]
    async fn mock_store_connect_failure_counts_attempt_only() {
        let store = MockStore::with_config(MockConfig {
            fail_connect: true,
            ..Default::default()
        });

        assert!(store.connect().await.is_err());
        assert_eq!(store.connect_attempts(), 1);
        assert_eq!(store.connects(), 0);
    }

    #[tokio::test]
    async fn clones_share_counters() {
        let store = MockStore::new();
        let handle = store.clone();

        let connection = handle.connect().await.unwrap();
        assert_eq!(store.open_connections(), 1);
        connection.close().await;
        assert_eq!(store.open_connections(), 0);
    }
}
