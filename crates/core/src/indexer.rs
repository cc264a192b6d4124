use crate::error::IndexError;
use crate::models::{MarkerState, SubmitOutcome};
use crate::traits::{ChunkSubmitter, CompletionLog};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

/// Client for the external indexing service.
///
/// Submissions are gated by the completion log so a chunk is sent at most
/// once per confirmed success, even across interrupted runs: the marker is
/// claimed as `pending` before the request and only promoted to done after a
/// 200 response. Rejections leave the marker pending, so a later run may try
/// again.
pub struct IndexingClient<C> {
    client: Client,
    api_url: String,
    api_key: String,
    completion: C,
}

impl<C> IndexingClient<C> {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>, completion: C) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
            completion,
        }
    }

    async fn send(&self, story_id: i64, index: i32, doc_html: &str) -> Result<(), IndexError> {
        let response = self
            .client
            .post(format!("{}/index_document", self.api_url))
            .header("Authorization", &self.api_key)
            .json(&json!({
                "doc_html": doc_html,
                "story_id": story_id,
                "index": index,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(IndexError::Rejected {
                story_id,
                index,
                status: status.as_u16(),
                detail,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl<C: CompletionLog + Send + Sync> ChunkSubmitter for IndexingClient<C> {
    async fn submit(
        &self,
        story_id: i64,
        index: i32,
        doc_html: &str,
    ) -> Result<SubmitOutcome, IndexError> {
        match self.completion.begin(story_id, index).await? {
            MarkerState::Confirmed => {
                tracing::debug!(story_id, index, "chunk already indexed, skipping");
                return Ok(SubmitOutcome::AlreadyDone);
            }
            MarkerState::Pending => {
                tracing::debug!(story_id, index, "retrying unconfirmed chunk");
            }
            MarkerState::New => {}
        }

        self.send(story_id, index, doc_html).await?;
        self.completion.confirm(story_id, index).await?;
        Ok(SubmitOutcome::Submitted)
    }

    async fn resubmit(
        &self,
        story_id: i64,
        index: i32,
        doc_html: &str,
    ) -> Result<(), IndexError> {
        self.send(story_id, index, doc_html).await?;
        self.completion.confirm(story_id, index).await?;
        Ok(())
    }
}
