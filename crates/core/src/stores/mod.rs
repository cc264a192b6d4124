mod postgres;
mod qdrant;
mod redis;

pub use postgres::PostgresRecordStore;
pub use qdrant::QdrantIndex;
pub use redis::RedisCompletionLog;
