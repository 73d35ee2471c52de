use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DocumentStore, InsertOutcome, StoreError, StoredDocument};

/// A thread-safe in-memory document store.
///
/// Used when no database is configured and by the test suite. Contents are
/// lost when the process exits.
#[derive(Default, Clone)]
pub struct MemoryDocumentStore {
    documents: Arc<RwLock<Vec<StoredDocument>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn documents(&self, collection: &str) -> Vec<StoredDocument> {
        let documents = self.documents.read().await;
        documents
            .iter()
            .filter(|doc| doc.collection == collection)
            .cloned()
            .collect()
    }

    pub async fn find(&self, collection: &str, id: &str) -> Option<StoredDocument> {
        let documents = self.documents.read().await;
        documents
            .iter()
            .find(|doc| doc.collection == collection && doc.id == id)
            .cloned()
    }
}

fn stored(collection: &str, key: Option<&str>, body: Value) -> Result<StoredDocument, StoreError> {
    if !body.is_object() {
        return Err(StoreError::NotAnObject);
    }
    Ok(StoredDocument {
        id: Uuid::new_v4().to_string(),
        collection: collection.to_string(),
        key: key.map(str::to_string),
        body,
        created_at: Utc::now(),
    })
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, collection: &str, document: Value) -> Result<String, StoreError> {
        let doc = stored(collection, None, document)?;
        let id = doc.id.clone();
        self.documents.write().await.push(doc);
        Ok(id)
    }

    async fn insert_with_key(
        &self,
        collection: &str,
        key: &str,
        document: Value,
    ) -> Result<InsertOutcome, StoreError> {
        let mut documents = self.documents.write().await;
        if let Some(existing) = documents
            .iter()
            .find(|doc| doc.collection == collection && doc.key.as_deref() == Some(key))
        {
            return Ok(InsertOutcome::Existing(existing.id.clone()));
        }

        let doc = stored(collection, Some(key), document)?;
        let id = doc.id.clone();
        documents.push(doc);
        Ok(InsertOutcome::Created(id))
    }
}
