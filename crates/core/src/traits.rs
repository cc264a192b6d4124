use crate::error::{IndexError, SyncError};
use crate::models::{EmbeddingRecord, MarkerState, SubmitOutcome};
use async_trait::async_trait;
use uuid::Uuid;

/// Idempotency log for chunk submissions, keyed by `(story_id, index)`.
///
/// Markers survive process restarts; there is no expiry. Clearing markers for
/// an intentional re-index happens out of band.
#[async_trait]
pub trait CompletionLog {
    /// Atomically claims the marker as `pending` if absent and reports the
    /// state it was in before this call.
    async fn begin(&self, story_id: i64, index: i32) -> Result<MarkerState, IndexError>;

    /// Records that the indexing service accepted the chunk.
    async fn confirm(&self, story_id: i64, index: i32) -> Result<(), IndexError>;
}

/// Read access to the relational store that owns the chunk rows.
#[async_trait]
pub trait RecordStore {
    async fn count_for_story(&self, story_id: i64) -> Result<u64, SyncError>;

    /// All rows for a story, ordered by chunk index.
    async fn records_for_story(&self, story_id: i64) -> Result<Vec<EmbeddingRecord>, SyncError>;

    /// One page of distinct story ids, in stable order.
    async fn distinct_story_ids(&self, offset: i64, limit: i64) -> Result<Vec<i64>, SyncError>;
}

/// Read access to the vector index holding one point per indexed chunk.
#[async_trait]
pub trait VectorIndex {
    /// Number of points tagged with the story id, bounded by `limit` (no more
    /// than the relational row count is ever expected).
    async fn count_for_story(&self, story_id: i64, limit: u64) -> Result<u64, SyncError>;

    /// Whether a point currently exists. Unknown ids are not an error.
    async fn point_exists(&self, point_id: Uuid) -> Result<bool, SyncError>;
}

/// Chunk submission to the external indexing service.
#[async_trait]
pub trait ChunkSubmitter {
    /// Submission gated by the completion log: confirmed chunks are skipped
    /// without a network call.
    async fn submit(
        &self,
        story_id: i64,
        index: i32,
        doc_html: &str,
    ) -> Result<SubmitOutcome, IndexError>;

    /// Submission that bypasses the completion gate. Used by repair, where
    /// store-observable truth already says the point is missing.
    async fn resubmit(&self, story_id: i64, index: i32, doc_html: &str)
        -> Result<(), IndexError>;
}
