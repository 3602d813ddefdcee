//! Document store access.
//!
//! This module handles:
//! - The route to (database, collection) mapping
//! - Connector and connection abstractions over the store
//! - Scoped, per-request connection handling
//! - The MongoDB connector and an in-memory mock for testing

pub mod mock;
pub mod mongo;
pub mod types;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, instrument, Instrument};

use crate::error::StoreError;
use crate::metrics;

pub use mock::{MockConfig, MockStore};
pub use mongo::MongoConnector;
pub use types::{Document, Resource};

/// Opens fresh connections to the document store.
///
/// No pooling: every call yields a new connection owned by the caller.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Open a new connection.
    ///
    /// # Errors
    /// Returns [`StoreError::Connect`] if the store is unreachable. A failed
    /// connect must not leave anything open.
    async fn connect(&self) -> Result<Box<dyn StoreConnection>, StoreError>;
}

/// A single open store connection.
#[async_trait]
pub trait StoreConnection: Send + Sync {
    /// Fetch every document of `database.collection`, unfiltered, in store order.
    ///
    /// # Errors
    /// Returns [`StoreError::Query`] if the query or cursor iteration fails.
    async fn find_all(&self, database: &str, collection: &str)
        -> Result<Vec<Document>, StoreError>;

    /// Release the connection.
    async fn close(self: Box<Self>);
}

/// Read a whole collection over a connection that lives only for this call.
///
/// Connect, query and close run on their own task, so dropping the returned
/// future (client disconnect) neither aborts the query nor skips the close.
/// The connection is closed whether the query succeeds or fails.
#[instrument(skip(connector), fields(resource = %resource))]
pub async fn fetch_collection(
    connector: Arc<dyn StoreConnector>,
    resource: Resource,
) -> Result<Vec<Document>, StoreError> {
    let task = tokio::spawn(
        async move {
            let start = Instant::now();
            let connection = connector.connect().await?;

            let result = connection
                .find_all(resource.database(), resource.collection())
                .await;
            connection.close().await;

            metrics::record_store_fetch_latency(start, resource.collection());
            if let Ok(documents) = &result {
                debug!(count = documents.len(), "Fetched collection");
            }
            result
        }
        .in_current_span(),
    );

    task.await
        .map_err(|e| StoreError::Task(e.to_string()))?
}
