//! Query record storage behind a trait.
//!
//! `PgQueryStore` persists to Postgres; `MemoryQueryStore` keeps records in
//! process (used when no database is configured, and in tests).
//!
//! `AppState` holds an `Arc<dyn QueryStore>` chosen at startup.

pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::query::{normalize_user_id, NewQueryRecord, QueryRecord};

pub use postgres::PgQueryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait QueryStore: Send + Sync {
    /// Records of one article for one user, newest first.
    async fn list(&self, article_id: Uuid, user_id: &str) -> Result<Vec<QueryRecord>, StoreError>;

    /// Inserts a record, replacing any record with the same key.
    async fn save(&self, record: NewQueryRecord) -> Result<QueryRecord, StoreError>;

    /// Deletes a record owned by `user_id`. Returns false when nothing matched.
    async fn delete(&self, id: Uuid, user_id: &str) -> Result<bool, StoreError>;
}

/// In-process store. Records are kept newest first.
#[derive(Debug, Default)]
pub struct MemoryQueryStore {
    records: RwLock<Vec<QueryRecord>>,
}

impl MemoryQueryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueryStore for MemoryQueryStore {
    async fn list(&self, article_id: Uuid, user_id: &str) -> Result<Vec<QueryRecord>, StoreError> {
        let user_id = normalize_user_id(user_id);
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.article_id == article_id && r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn save(&self, record: NewQueryRecord) -> Result<QueryRecord, StoreError> {
        let record = record.into_record();
        let mut records = self.records.write().await;
        records.retain(|existing| existing.key() != record.key());
        records.insert(0, record.clone());
        Ok(record)
    }

    async fn delete(&self, id: Uuid, user_id: &str) -> Result<bool, StoreError> {
        let user_id = normalize_user_id(user_id);
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| !(r.id == id && r.user_id == user_id));
        Ok(records.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_record(article_id: Uuid, text: &str, prompt_type: &str, response: &str) -> NewQueryRecord {
        NewQueryRecord {
            article_id,
            user_id: "alice".to_string(),
            selected_text: text.to_string(),
            prompt_type: prompt_type.to_string(),
            prompt_label: prompt_type.to_uppercase(),
            ai_response: response.to_string(),
            article_language: "fr".to_string(),
            mother_tongue: "en".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_scoped() {
        let store = MemoryQueryStore::new();
        let article = Uuid::new_v4();
        let other = Uuid::new_v4();
        store.save(new_record(article, "chat", "quick", "cat")).await.unwrap();
        store.save(new_record(article, "chien", "quick", "dog")).await.unwrap();
        store.save(new_record(other, "oiseau", "quick", "bird")).await.unwrap();

        let listed = store.list(article, "alice").await.unwrap();
        let texts: Vec<&str> = listed.iter().map(|r| r.selected_text.as_str()).collect();
        assert_eq!(texts, vec!["chien", "chat"]);
        assert!(store.list(article, "bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_requery_replaces_and_moves_to_front() {
        let store = MemoryQueryStore::new();
        let article = Uuid::new_v4();
        let first = store.save(new_record(article, "chat", "quick", "cat")).await.unwrap();
        store.save(new_record(article, "chien", "quick", "dog")).await.unwrap();
        let again = store
            .save(new_record(article, "chat", "quick", "a cat"))
            .await
            .unwrap();

        let listed = store.list(article, "alice").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, again.id);
        assert_ne!(again.id, first.id);
        assert_eq!(listed[0].ai_response, "a cat");
    }

    #[tokio::test]
    async fn test_different_prompt_type_is_a_separate_record() {
        let store = MemoryQueryStore::new();
        let article = Uuid::new_v4();
        store.save(new_record(article, "chat", "quick", "cat")).await.unwrap();
        store.save(new_record(article, "chat", "deep", "felis catus")).await.unwrap();
        assert_eq!(store.list(article, "alice").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_requires_owner() {
        let store = MemoryQueryStore::new();
        let article = Uuid::new_v4();
        let record = store.save(new_record(article, "chat", "quick", "cat")).await.unwrap();

        assert!(!store.delete(record.id, "bob").await.unwrap());
        assert!(store.delete(record.id, "alice").await.unwrap());
        assert!(!store.delete(record.id, "alice").await.unwrap());
        assert!(store.list(article, "alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_user_normalization() {
        let store = MemoryQueryStore::new();
        let article = Uuid::new_v4();
        let mut record = new_record(article, "chat", "quick", "cat");
        record.user_id = String::new();
        store.save(record).await.unwrap();
        assert_eq!(store.list(article, "").await.unwrap().len(), 1);
        assert_eq!(store.list(article, "anonymous").await.unwrap().len(), 1);
    }
}
