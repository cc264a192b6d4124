use crate::error::{IndexError, SyncError};
use crate::models::RepairSummary;
use crate::retry::RetryPolicy;
use crate::traits::{ChunkSubmitter, RecordStore, VectorIndex};

/// Re-drives indexing for drifted stories.
///
/// The aggregate count check that flagged a story is a coarser signal than
/// point-level truth, so each row is checked individually: only rows whose
/// point is missing from the vector index are resubmitted. Running repair
/// twice over the same drift set therefore performs no redundant work.
pub struct RepairEngine<R, V, S> {
    records: R,
    index: V,
    submitter: S,
    retry: RetryPolicy,
}

impl<R, V, S> RepairEngine<R, V, S>
where
    R: RecordStore + Send + Sync,
    V: VectorIndex + Send + Sync,
    S: ChunkSubmitter + Send + Sync,
{
    pub fn new(records: R, index: V, submitter: S, retry: RetryPolicy) -> Self {
        Self {
            records,
            index,
            submitter,
            retry,
        }
    }

    pub async fn repair(&self, story_ids: &[i64]) -> Result<RepairSummary, SyncError> {
        let mut summary = RepairSummary::default();

        for &story_id in story_ids {
            let rows = self.records.records_for_story(story_id).await?;
            summary.stories += 1;

            for row in rows {
                let exists = match row.qdrant_point_id {
                    Some(point_id) => {
                        self.retry
                            .run("qdrant", || self.index.point_exists(point_id))
                            .await?
                    }
                    // A row that never got a point id was never indexed.
                    None => false,
                };

                if exists {
                    summary.already_present += 1;
                    continue;
                }

                match self
                    .submitter
                    .resubmit(row.story_id, row.index, &row.doc_html)
                    .await
                {
                    Ok(()) => {
                        tracing::info!(story_id, index = row.index, "resubmitted missing chunk");
                        summary.resubmitted += 1;
                    }
                    Err(IndexError::Rejected { status, detail, .. }) => {
                        tracing::error!(
                            story_id,
                            index = row.index,
                            status,
                            detail = %detail,
                            "resubmission rejected"
                        );
                        summary.rejected += 1;
                    }
                    Err(error) => return Err(error.into()),
                }
            }
        }

        Ok(summary)
    }
}
