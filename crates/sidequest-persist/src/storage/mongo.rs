use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Client, Collection};
use serde_json::Value;

use super::StorageBackend;
use crate::error::{PersistError, Result};

/// Storage backed by a MongoDB collection, one document per key
pub struct MongoStorage {
    collection: Collection<Document>,
}

impl MongoStorage {
    /// Connect to MongoDB and use the `kv` collection of `database`
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        Ok(Self::new(&client, database))
    }

    pub fn new(client: &Client, database: &str) -> Self {
        let collection = client.database(database).collection("kv");
        Self { collection }
    }
}

#[async_trait]
impl StorageBackend for MongoStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let found = self.collection.find_one(doc! { "_id": key }).await?;
        Ok(found
            .and_then(|mut document| document.remove("value"))
            .map(Bson::into_relaxed_extjson))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let value = bson::to_bson(&value)?;
        self.collection
            .replace_one(doc! { "_id": key }, doc! { "_id": key, "value": value })
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.collection.delete_one(doc! { "_id": key }).await?;
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let documents: Vec<Document> = self.collection.find(doc! {}).await?.try_collect().await?;
        Ok(documents
            .iter()
            .filter_map(|document| document.get_str("_id").ok().map(str::to_string))
            .collect())
    }
}
