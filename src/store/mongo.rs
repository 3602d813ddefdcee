//! MongoDB connector.

use async_trait::async_trait;
use chrono::SecondsFormat;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document as BsonDocument};
use mongodb::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::StoreError;

use super::{Document, StoreConnection, StoreConnector};

/// Opens a dedicated MongoDB client per connection.
#[derive(Debug, Clone)]
pub struct MongoConnector {
    uri: String,
}

impl MongoConnector {
    /// Create a connector for the given connection URI.
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

#[async_trait]
impl StoreConnector for MongoConnector {
    #[instrument(skip(self))]
    async fn connect(&self) -> Result<Box<dyn StoreConnection>, StoreError> {
        let client = Client::with_uri_str(&self.uri)
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;

        // Client construction is lazy; ping so an unreachable store fails here.
        if let Err(e) = client.database("admin").run_command(doc! { "ping": 1 }).await {
            warn!(error = %e, "MongoDB ping failed, shutting client down");
            client.shutdown().await;
            return Err(StoreError::Connect(e.to_string()));
        }

        debug!("MongoDB connection opened");
        Ok(Box::new(MongoConnection { client }))
    }
}

struct MongoConnection {
    client: Client,
}

#[async_trait]
impl StoreConnection for MongoConnection {
    async fn find_all(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let query_error = |e: mongodb::error::Error| StoreError::Query {
            database: database.to_string(),
            collection: collection.to_string(),
            reason: e.to_string(),
        };

        let cursor = self
            .client
            .database(database)
            .collection::<BsonDocument>(collection)
            .find(doc! {})
            .await
            .map_err(query_error)?;

        let documents: Vec<BsonDocument> = cursor.try_collect().await.map_err(query_error)?;

        Ok(documents.into_iter().map(to_json_document).collect())
    }

    async fn close(self: Box<Self>) {
        self.client.shutdown().await;
        debug!("MongoDB connection closed");
    }
}

/// Render a BSON document as JSON.
///
/// ObjectIds become hex strings and datetimes RFC 3339 strings; other
/// values use relaxed extended JSON.
pub fn to_json_document(document: BsonDocument) -> Document {
    document
        .into_iter()
        .map(|(key, value)| (key, bson_to_json(value)))
        .collect()
}

fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => {
            Value::String(dt.to_chrono().to_rfc3339_opts(SecondsFormat::Millis, true))
        }
        Bson::Document(inner) => Value::Object(to_json_document(inner)),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}
