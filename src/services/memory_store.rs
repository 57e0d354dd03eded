//! In-process document store.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use crate::errors::StoreResult;
use super::document_store::{assign_id, matches_filter, DocumentStore};

/// Keeps each collection as an insertion-ordered `Vec`. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert(&self, collection: &str, mut record: Value) -> StoreResult<String> {
        let id = assign_id(&mut record)?;
        let mut collections = self.collections.write().await;
        collections.entry(collection.to_string()).or_default().push(record);
        Ok(id)
    }

    async fn find_one(&self, collection: &str, filter: &Value) -> StoreResult<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| matches_filter(doc, filter)))
            .cloned())
    }

    async fn find_all(&self, collection: &str, filter: &Value) -> StoreResult<Vec<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| matches_filter(doc, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn drop_collection(&self, collection: &str) -> StoreResult<()> {
        self.collections.write().await.remove(collection);
        Ok(())
    }
}
