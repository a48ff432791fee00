use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::query::{normalize_user_id, NewQueryRecord, QueryRecord};
use crate::store::{QueryStore, StoreError};

/// Postgres-backed store over the `query_records` table.
#[derive(Clone)]
pub struct PgQueryStore {
    pool: PgPool,
}

impl PgQueryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueryStore for PgQueryStore {
    async fn list(&self, article_id: Uuid, user_id: &str) -> Result<Vec<QueryRecord>, StoreError> {
        Ok(sqlx::query_as::<_, QueryRecord>(
            r#"
            SELECT * FROM query_records
            WHERE article_id = $1 AND user_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(article_id)
        .bind(normalize_user_id(user_id))
        .fetch_all(&self.pool)
        .await?)
    }

    /// Replace-by-key: the previous record for the key is deleted and a new row
    /// inserted in one transaction. Rows are never UPDATEd.
    async fn save(&self, record: NewQueryRecord) -> Result<QueryRecord, StoreError> {
        let record = record.into_record();
        let mut tx = self.pool.begin().await?;

        let replaced = sqlx::query(
            r#"
            DELETE FROM query_records
            WHERE article_id = $1 AND user_id = $2 AND selected_text = $3 AND prompt_type = $4
            "#,
        )
        .bind(record.article_id)
        .bind(&record.user_id)
        .bind(&record.selected_text)
        .bind(&record.prompt_type)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let saved = sqlx::query_as::<_, QueryRecord>(
            r#"
            INSERT INTO query_records
                (id, article_id, user_id, selected_text, prompt_type, prompt_label,
                 ai_response, article_language, mother_tongue, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(record.id)
        .bind(record.article_id)
        .bind(&record.user_id)
        .bind(&record.selected_text)
        .bind(&record.prompt_type)
        .bind(&record.prompt_label)
        .bind(&record.ai_response)
        .bind(&record.article_language)
        .bind(&record.mother_tongue)
        .bind(record.created_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Saved query record {} for article {} (replaced {replaced})",
            saved.id, saved.article_id
        );
        Ok(saved)
    }

    async fn delete(&self, id: Uuid, user_id: &str) -> Result<bool, StoreError> {
        let deleted = sqlx::query("DELETE FROM query_records WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(normalize_user_id(user_id))
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }
}
