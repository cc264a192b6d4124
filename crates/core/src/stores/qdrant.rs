use crate::error::SyncError;
use crate::traits::VectorIndex;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

/// `VectorIndex` over the Qdrant REST API.
pub struct QdrantIndex {
    endpoint: String,
    collection: String,
    api_key: Option<String>,
    client: Client,
}

impl QdrantIndex {
    pub fn new(
        endpoint: impl Into<String>,
        collection: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            collection: collection.into(),
            api_key,
            client: Client::new(),
        }
    }

    fn request(&self, url: String) -> reqwest::RequestBuilder {
        let request = self.client.post(url);
        match &self.api_key {
            Some(key) => request.header("api-key", key),
            None => request,
        }
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn count_for_story(&self, story_id: i64, limit: u64) -> Result<u64, SyncError> {
        let response = self
            .request(format!(
                "{}/collections/{}/points/scroll",
                self.endpoint, self.collection
            ))
            .json(&json!({
                "filter": {
                    "must": [
                        {
                            "key": "story_id",
                            // Payloads tag points with the story id as a string.
                            "match": { "value": story_id.to_string() }
                        }
                    ]
                },
                "limit": limit,
                "with_payload": false,
                "with_vector": false,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SyncError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        let parsed: Value = response.json().await?;
        let count = parsed
            .pointer("/result/points")
            .and_then(Value::as_array)
            .map(Vec::len)
            .ok_or_else(|| SyncError::BackendResponse {
                backend: "qdrant".to_string(),
                details: "scroll response missing result.points".to_string(),
            })?;

        Ok(count as u64)
    }

    async fn point_exists(&self, point_id: Uuid) -> Result<bool, SyncError> {
        let response = self
            .request(format!(
                "{}/collections/{}/points",
                self.endpoint, self.collection
            ))
            .json(&json!({ "ids": [point_id.to_string()] }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SyncError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        let parsed: Value = response.json().await?;
        let found = parsed
            .pointer("/result")
            .and_then(Value::as_array)
            .map(Vec::len)
            .ok_or_else(|| SyncError::BackendResponse {
                backend: "qdrant".to_string(),
                details: "retrieve response missing result".to_string(),
            })?;

        Ok(found > 0)
    }
}
