use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};
use serde_json::Value;
use uuid::Uuid;

use super::{DocumentStore, InsertOutcome, StoreError, StoredDocument};
use crate::entity::documents::{
    ActiveModel as DocumentActive, Column as DocumentCol, Entity as Documents,
    Model as DocumentModel,
};

/// Document store on a single JSONB table. `created_at` defaults to `now()`
/// in the database, so the timestamp is always the server's.
#[derive(Clone)]
pub struct PgDocumentStore {
    conn: DatabaseConnection,
}

impl PgDocumentStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let document = Documents::find_by_id(id)
            .filter(DocumentCol::Collection.eq(collection))
            .one(&self.conn)
            .await?;
        Ok(document.map(stored_from_entity))
    }

    pub async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        let total = Documents::find()
            .filter(DocumentCol::Collection.eq(collection))
            .count(&self.conn)
            .await?;
        Ok(total)
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(&self, collection: &str, document: Value) -> Result<String, StoreError> {
        let model = new_document(collection, None, document)?
            .insert(&self.conn)
            .await?;
        Ok(model.id.to_string())
    }

    async fn insert_with_key(
        &self,
        collection: &str,
        key: &str,
        document: Value,
    ) -> Result<InsertOutcome, StoreError> {
        let active = new_document(collection, Some(key), document)?;
        let inserted = Documents::insert(active)
            .on_conflict(
                OnConflict::columns([DocumentCol::Collection, DocumentCol::DocumentKey])
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.conn)
            .await;

        match inserted {
            Ok(result) => Ok(InsertOutcome::Created(result.last_insert_id.to_string())),
            Err(DbErr::RecordNotInserted) => {
                let existing = Documents::find()
                    .filter(
                        Condition::all()
                            .add(DocumentCol::Collection.eq(collection))
                            .add(DocumentCol::DocumentKey.eq(key)),
                    )
                    .one(&self.conn)
                    .await?
                    .ok_or_else(|| {
                        DbErr::RecordNotFound(format!("{collection}/{key} vanished after conflict"))
                    })?;
                Ok(InsertOutcome::Existing(existing.id.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn new_document(
    collection: &str,
    key: Option<&str>,
    document: Value,
) -> Result<DocumentActive, StoreError> {
    if !document.is_object() {
        return Err(StoreError::NotAnObject);
    }
    Ok(DocumentActive {
        id: Set(Uuid::new_v4()),
        collection: Set(collection.to_string()),
        document_key: Set(key.map(str::to_string)),
        body: Set(document),
        created_at: NotSet,
    })
}

fn stored_from_entity(model: DocumentModel) -> StoredDocument {
    StoredDocument {
        id: model.id.to_string(),
        collection: model.collection,
        key: model.document_key,
        body: model.body,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
