use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

pub mod memory;
pub mod postgres;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

pub const ORDERS_COLLECTION: &str = "orders";

#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub collection: String,
    pub key: Option<String>,
    pub body: Value,
    pub created_at: DateTime<Utc>,
}

impl StoredDocument {
    /// The body with the store's creation timestamp as `createdAt`.
    pub fn to_document(&self) -> Value {
        let mut document = self.body.clone();
        if let Some(fields) = document.as_object_mut() {
            fields.insert(
                "createdAt".to_string(),
                Value::String(self.created_at.to_rfc3339()),
            );
        }
        document
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Created(String),
    /// A document with the same key was already present; carries its id.
    Existing(String),
}

impl InsertOutcome {
    pub fn id(&self) -> &str {
        match self {
            InsertOutcome::Created(id) | InsertOutcome::Existing(id) => id,
        }
    }

    pub fn into_id(self) -> String {
        match self {
            InsertOutcome::Created(id) | InsertOutcome::Existing(id) => id,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("document store did not answer within {0:?}")]
    Timeout(Duration),

    #[error("document is not a JSON object")]
    NotAnObject,
}

/// Schemaless document store with server-assigned ids and creation timestamps.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Appends a document and returns the id the store assigned to it.
    async fn insert(&self, collection: &str, document: Value) -> Result<String, StoreError>;

    /// Inserts a document under a caller-chosen key unless one already exists
    /// in the collection, in which case the existing document is left alone.
    async fn insert_with_key(
        &self,
        collection: &str,
        key: &str,
        document: Value,
    ) -> Result<InsertOutcome, StoreError>;
}
