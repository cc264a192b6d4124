use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of the `doc_embeddings` table: a chunk that was submitted for
/// indexing at some point, together with the id its vector is stored under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmbeddingRecord {
    pub story_id: i64,
    pub index: i32,
    pub doc_html: String,
    /// Null until the indexing service has confirmed the upsert.
    pub qdrant_point_id: Option<Uuid>,
}

/// A raw story document before chunking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryDocument {
    pub story_id: i64,
    pub doc_html: String,
}

/// A story whose vector-index point count fell behind its row count.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DriftRecord {
    pub story_id: i64,
    pub record_count: u64,
    pub point_count: u64,
}

/// State of a completion marker when a submission attempt begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerState {
    /// No marker existed; this attempt claimed it.
    New,
    /// A previous attempt marked the chunk but never confirmed success.
    Pending,
    /// The chunk was confirmed indexed.
    Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    AlreadyDone,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IngestSummary {
    pub chunks: usize,
    pub submitted: usize,
    pub already_done: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RepairSummary {
    pub stories: usize,
    pub resubmitted: usize,
    pub already_present: usize,
    pub rejected: usize,
}
