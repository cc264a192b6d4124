pub mod audit;
pub mod chunking;
pub mod error;
pub mod indexer;
pub mod ingest;
pub mod models;
pub mod repair;
pub mod report;
pub mod retry;
pub mod stores;
pub mod traits;

pub use audit::Auditor;
pub use chunking::{chunk_document, strip_markup, MIN_SENTENCES_PER_CHUNK};
pub use error::{IndexError, SyncError};
pub use indexer::IndexingClient;
pub use ingest::{ingest_story, read_story_documents};
pub use models::{
    DriftRecord, EmbeddingRecord, IngestSummary, MarkerState, RepairSummary, StoryDocument,
    SubmitOutcome,
};
pub use repair::RepairEngine;
pub use report::{read_drift_report, write_drift_report};
pub use retry::RetryPolicy;
pub use stores::{PostgresRecordStore, QdrantIndex, RedisCompletionLog};
pub use traits::{ChunkSubmitter, CompletionLog, RecordStore, VectorIndex};
