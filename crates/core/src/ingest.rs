use crate::chunking::chunk_document;
use crate::error::{IndexError, SyncError};
use crate::models::{IngestSummary, StoryDocument, SubmitOutcome};
use crate::traits::ChunkSubmitter;
use std::fs;
use std::path::Path;

/// Reads raw story documents from a JSONL file, one document per line.
pub fn read_story_documents(path: &Path) -> Result<Vec<StoryDocument>, SyncError> {
    let data = fs::read_to_string(path)?;
    let mut documents = Vec::new();

    for line in data.lines() {
        if line.trim().is_empty() {
            continue;
        }
        documents.push(serde_json::from_str(line)?);
    }

    Ok(documents)
}

/// Chunks one story and submits every chunk under its zero-based index.
///
/// Rejections from the indexing service are logged and counted instead of
/// aborting the document; cache or transport failures abort, since nothing
/// useful can be submitted without them.
pub async fn ingest_story<S: ChunkSubmitter>(
    submitter: &S,
    story_id: i64,
    doc_html: &str,
) -> Result<IngestSummary, SyncError> {
    let chunks = chunk_document(doc_html);
    let mut summary = IngestSummary {
        chunks: chunks.len(),
        ..Default::default()
    };

    for (index, chunk) in chunks.iter().enumerate() {
        match submitter.submit(story_id, index as i32, chunk).await {
            Ok(SubmitOutcome::Submitted) => summary.submitted += 1,
            Ok(SubmitOutcome::AlreadyDone) => summary.already_done += 1,
            Err(IndexError::Rejected { status, detail, .. }) => {
                tracing::error!(
                    story_id,
                    index,
                    status,
                    detail = %detail,
                    "indexing service rejected chunk"
                );
                summary.rejected += 1;
            }
            Err(error) => return Err(error.into()),
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    #[derive(Default)]
    struct RecordingSubmitter {
        calls: Mutex<Vec<(i64, i32, String)>>,
        reject_index: Option<i32>,
    }

    #[async_trait]
    impl ChunkSubmitter for RecordingSubmitter {
        async fn submit(
            &self,
            story_id: i64,
            index: i32,
            doc_html: &str,
        ) -> Result<SubmitOutcome, IndexError> {
            if self.reject_index == Some(index) {
                return Err(IndexError::Rejected {
                    story_id,
                    index,
                    status: 500,
                    detail: "nope".to_string(),
                });
            }
            self.calls
                .lock()
                .unwrap()
                .push((story_id, index, doc_html.to_string()));
            Ok(SubmitOutcome::Submitted)
        }

        async fn resubmit(
            &self,
            story_id: i64,
            index: i32,
            doc_html: &str,
        ) -> Result<(), IndexError> {
            self.calls
                .lock()
                .unwrap()
                .push((story_id, index, doc_html.to_string()));
            Ok(())
        }
    }

    fn long_story(sentences: usize) -> String {
        (0..sentences)
            .map(|i| format!("Sentence {i} of the story. "))
            .collect()
    }

    #[tokio::test]
    async fn chunks_are_submitted_in_document_order() {
        let submitter = RecordingSubmitter::default();
        let story = format!("<p>{}</p>", long_story(25));

        let summary = ingest_story(&submitter, 42, &story).await.unwrap();

        assert_eq!(summary.chunks, 2);
        assert_eq!(summary.submitted, 2);
        let calls = submitter.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!((calls[0].0, calls[0].1), (42, 0));
        assert_eq!((calls[1].0, calls[1].1), (42, 1));
    }

    #[tokio::test]
    async fn empty_documents_submit_nothing() {
        let submitter = RecordingSubmitter::default();
        let summary = ingest_story(&submitter, 1, "<table><tr><td>x</td></tr></table>")
            .await
            .unwrap();

        assert_eq!(summary.chunks, 0);
        assert!(submitter.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejections_are_counted_without_aborting() {
        let submitter = RecordingSubmitter {
            reject_index: Some(0),
            ..Default::default()
        };
        let story = format!("<p>{}</p>", long_story(25));

        let summary = ingest_story(&submitter, 5, &story).await.unwrap();

        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.submitted, 1);
    }

    #[test]
    fn jsonl_reader_skips_blank_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"story_id": 1, "doc_html": "<p>One.</p>"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"story_id": 2, "doc_html": "<p>Two.</p>"}}"#).unwrap();

        let documents = read_story_documents(file.path()).unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].story_id, 1);
        assert_eq!(documents[1].doc_html, "<p>Two.</p>");
    }
}
