use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("indexing service rejected chunk {story_id}/{index} with status {status}: {detail}")]
    Rejected {
        story_id: i64,
        index: i32,
        status: u16,
        detail: String,
    },
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },

    #[error("{backend} unavailable after {attempts} attempts: {detail}")]
    Unavailable {
        backend: String,
        attempts: u32,
        detail: String,
    },

    #[error("invalid drift report: {0}")]
    InvalidReport(String),

    #[error(transparent)]
    Index(#[from] IndexError),
}
