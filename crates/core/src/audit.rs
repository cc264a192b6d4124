use crate::error::SyncError;
use crate::models::DriftRecord;
use crate::retry::RetryPolicy;
use crate::traits::{RecordStore, VectorIndex};

/// Compares per-story row counts against vector-index point counts and emits
/// the stories whose index fell behind.
pub struct Auditor<R, V> {
    records: R,
    index: V,
    retry: RetryPolicy,
}

impl<R, V> Auditor<R, V>
where
    R: RecordStore + Send + Sync,
    V: VectorIndex + Send + Sync,
{
    pub fn new(records: R, index: V, retry: RetryPolicy) -> Self {
        Self {
            records,
            index,
            retry,
        }
    }

    /// Audits a batch of story ids, returning drift records in input order.
    ///
    /// The point-count query is bounded by the row count, since no more
    /// points than rows are ever expected for a consistent story.
    pub async fn audit_batch(&self, story_ids: &[i64]) -> Result<Vec<DriftRecord>, SyncError> {
        let mut drifted = Vec::new();

        for &story_id in story_ids {
            let record_count = self.records.count_for_story(story_id).await?;
            if record_count == 0 {
                // No rows means nothing can be under-indexed, and the scroll
                // API rejects a zero limit.
                continue;
            }

            let point_count = self
                .retry
                .run("qdrant", || {
                    self.index.count_for_story(story_id, record_count)
                })
                .await?;

            if point_count < record_count {
                tracing::info!(story_id, record_count, point_count, "story is under-indexed");
                drifted.push(DriftRecord {
                    story_id,
                    record_count,
                    point_count,
                });
            }
        }

        Ok(drifted)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{FakePoints, FakeRecords};
    use super::*;
    use crate::models::EmbeddingRecord;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    fn rows_for(story_id: i64, count: usize) -> Vec<EmbeddingRecord> {
        (0..count)
            .map(|index| EmbeddingRecord {
                story_id,
                index: index as i32,
                doc_html: format!("<p>Chunk {index}.</p>"),
                qdrant_point_id: Some(uuid::Uuid::new_v4()),
            })
            .collect()
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        }
    }

    #[tokio::test]
    async fn under_indexed_stories_are_flagged() {
        let records = FakeRecords::with_rows(rows_for(42, 5));
        let points = FakePoints {
            counts: [(42, 3)].into(),
            ..Default::default()
        };

        let auditor = Auditor::new(records, points, fast_retry());
        let drifted = auditor.audit_batch(&[42]).await.unwrap();

        assert_eq!(
            drifted,
            vec![DriftRecord {
                story_id: 42,
                record_count: 5,
                point_count: 3,
            }]
        );
    }

    #[tokio::test]
    async fn consistent_stories_are_not_flagged() {
        let records = FakeRecords::with_rows(rows_for(42, 5));
        let points = FakePoints {
            counts: [(42, 5)].into(),
            ..Default::default()
        };

        let auditor = Auditor::new(records, points, fast_retry());
        let drifted = auditor.audit_batch(&[42]).await.unwrap();
        assert!(drifted.is_empty());
    }

    #[tokio::test]
    async fn stories_without_rows_are_skipped() {
        let records = FakeRecords::default();
        let points = FakePoints::default();

        let auditor = Auditor::new(records, points, fast_retry());
        let drifted = auditor.audit_batch(&[1, 2, 3]).await.unwrap();
        assert!(drifted.is_empty());
    }

    #[tokio::test]
    async fn transient_index_failures_are_retried() {
        let records = FakeRecords::with_rows(rows_for(8, 5));
        let points = FakePoints {
            counts: [(8, 2)].into(),
            failures_remaining: AtomicU32::new(2),
            ..Default::default()
        };

        let auditor = Auditor::new(records, points, fast_retry());
        let drifted = auditor.audit_batch(&[8]).await.unwrap();
        assert_eq!(drifted.len(), 1);
        assert_eq!(drifted[0].point_count, 2);
    }

    #[tokio::test]
    async fn persistent_index_failures_surface_unavailable() {
        let records = FakeRecords::with_rows(rows_for(8, 5));
        let points = FakePoints {
            counts: [(8, 5)].into(),
            failures_remaining: AtomicU32::new(100),
            ..Default::default()
        };

        let auditor = Auditor::new(records, points, fast_retry());
        let result = auditor.audit_batch(&[8]).await;
        assert!(matches!(result, Err(SyncError::Unavailable { .. })));
    }
}
