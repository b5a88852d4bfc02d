use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use super::StoreError;
use crate::models::document::Document;

/// Access to the `documents` table. Every read is scoped to an owner.
#[derive(Clone)]
pub struct DocumentRepo {
    pool: SqlitePool,
}

impl DocumentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        filename: &str,
        content: &str,
        uploaded_by: &str,
    ) -> Result<Document, StoreError> {
        let id = Uuid::new_v4().to_string();
        let document = sqlx::query_as::<_, Document>(
            "INSERT INTO documents (id, filename, content, uploaded_by, created_at) VALUES (?, ?, ?, ?, ?) \
             RETURNING id, filename, content, uploaded_by, created_at",
        )
        .bind(&id)
        .bind(filename)
        .bind(content)
        .bind(uploaded_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(document)
    }

    /// All documents for `owner`, in insertion order.
    pub async fn find_by_owner(&self, owner: &str) -> Result<Vec<Document>, StoreError> {
        let documents = sqlx::query_as::<_, Document>(
            "SELECT id, filename, content, uploaded_by, created_at FROM documents \
             WHERE uploaded_by = ? ORDER BY rowid",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(documents)
    }

    pub async fn find_by_id_for_owner(
        &self,
        id: &str,
        owner: &str,
    ) -> Result<Option<Document>, StoreError> {
        let document = sqlx::query_as::<_, Document>(
            "SELECT id, filename, content, uploaded_by, created_at FROM documents \
             WHERE id = ? AND uploaded_by = ?",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(document)
    }
}
