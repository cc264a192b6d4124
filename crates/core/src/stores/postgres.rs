use crate::error::SyncError;
use crate::models::EmbeddingRecord;
use crate::traits::RecordStore;
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// `RecordStore` over the `doc_embeddings` table.
///
/// Expected schema: `story_id BIGINT`, `"index" INTEGER`, `doc_html TEXT`,
/// `qdrant_point_id UUID NULL`, unique on `(story_id, "index")`.
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn count_for_story(&self, story_id: i64) -> Result<u64, SyncError> {
        let row = sqlx::query("SELECT COUNT(*) FROM doc_embeddings WHERE story_id = $1")
            .bind(story_id)
            .fetch_one(&self.pool)
            .await?;

        let count: i64 = row.try_get(0)?;
        Ok(count as u64)
    }

    async fn records_for_story(&self, story_id: i64) -> Result<Vec<EmbeddingRecord>, SyncError> {
        let rows = sqlx::query(
            r#"
            SELECT doc_html, story_id, "index", qdrant_point_id
            FROM doc_embeddings
            WHERE story_id = $1
            ORDER BY "index" ASC
            "#,
        )
        .bind(story_id)
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(EmbeddingRecord {
                doc_html: row.try_get("doc_html")?,
                story_id: row.try_get("story_id")?,
                index: row.try_get("index")?,
                qdrant_point_id: row.try_get::<Option<Uuid>, _>("qdrant_point_id")?,
            });
        }

        Ok(records)
    }

    async fn distinct_story_ids(&self, offset: i64, limit: i64) -> Result<Vec<i64>, SyncError> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT story_id
            FROM doc_embeddings
            ORDER BY story_id ASC
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut story_ids = Vec::with_capacity(rows.len());
        for row in rows {
            story_ids.push(row.try_get(0)?);
        }

        Ok(story_ids)
    }
}
