use crate::error::IndexError;
use crate::models::MarkerState;
use crate::traits::CompletionLog;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

const MARKER_PENDING: &str = "pending";
const MARKER_DONE: &str = "done";

/// `CompletionLog` backed by a shared Redis instance.
///
/// Keys are `"{story_id}-{index}"`. A `SET NX` claims the marker as pending,
/// so concurrent and successive runs agree on who attempts a chunk first;
/// markers are never expired or deleted here.
#[derive(Clone)]
pub struct RedisCompletionLog {
    connection: ConnectionManager,
}

impl RedisCompletionLog {
    pub async fn connect(url: &str) -> Result<Self, IndexError> {
        let client = redis::Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }

    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }

    fn marker_key(story_id: i64, index: i32) -> String {
        format!("{story_id}-{index}")
    }
}

#[async_trait]
impl CompletionLog for RedisCompletionLog {
    async fn begin(&self, story_id: i64, index: i32) -> Result<MarkerState, IndexError> {
        let mut connection = self.connection.clone();
        let key = Self::marker_key(story_id, index);

        let claimed: bool = connection.set_nx(&key, MARKER_PENDING).await?;
        if claimed {
            return Ok(MarkerState::New);
        }

        let value: Option<String> = connection.get(&key).await?;
        match value.as_deref() {
            Some(MARKER_DONE) => Ok(MarkerState::Confirmed),
            _ => Ok(MarkerState::Pending),
        }
    }

    async fn confirm(&self, story_id: i64, index: i32) -> Result<(), IndexError> {
        let mut connection = self.connection.clone();
        let key = Self::marker_key(story_id, index);
        let _: () = connection.set(&key, MARKER_DONE).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_keys_match_the_cache_convention() {
        assert_eq!(RedisCompletionLog::marker_key(42, 0), "42-0");
        assert_eq!(RedisCompletionLog::marker_key(7, 13), "7-13");
    }
}
