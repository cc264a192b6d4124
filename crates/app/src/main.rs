use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::PathBuf;
use story_index_core::{
    ingest_story, read_drift_report, read_story_documents, write_drift_report, Auditor,
    IndexingClient, PostgresRecordStore, QdrantIndex, RecordStore, RedisCompletionLog,
    RepairEngine, RetryPolicy,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "story-index", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Postgres connection string for the chunk store
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Redis URL for the completion-marker cache
    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    redis_url: String,

    /// Qdrant base URL
    #[arg(long, env = "QDRANT_URL", default_value = "http://localhost:6333")]
    qdrant_url: String,

    /// Qdrant API key
    #[arg(long, env = "QDRANT_API_KEY")]
    qdrant_api_key: Option<String>,

    /// Qdrant collection holding the chunk points
    #[arg(long, env = "QDRANT_COLLECTION", default_value = "doc_embeddings")]
    qdrant_collection: String,

    /// Indexing service base URL
    #[arg(long, env = "API_URL")]
    api_url: Option<String>,

    /// Indexing service API key
    #[arg(long, env = "API_KEY")]
    api_key: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Chunk raw story documents and submit every chunk for indexing.
    Ingest {
        /// JSONL file with one {"story_id", "doc_html"} document per line.
        #[arg(long)]
        input: PathBuf,
    },
    /// Audit one shard of story ids and write the drifted ones to a CSV.
    Audit {
        /// Zero-based shard number; shard N covers distinct story ids
        /// [N * batch_size, (N + 1) * batch_size).
        #[arg(long)]
        shard: u32,
        /// Number of story ids per shard.
        #[arg(long, default_value = "10000")]
        batch_size: u32,
        /// Directory for the per-shard drift reports.
        #[arg(long, default_value = "./erred_stories")]
        output_dir: PathBuf,
    },
    /// Re-drive indexing for the stories listed in a drift report.
    Repair {
        /// Drift report CSV produced by the audit command.
        #[arg(long)]
        report: PathBuf,
    },
}

impl Cli {
    async fn pg_pool(&self) -> anyhow::Result<PgPool> {
        let database_url = self
            .database_url
            .as_deref()
            .context("DATABASE_URL must be set for this command")?;
        PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("connecting to postgres")
    }

    async fn indexing_client(&self) -> anyhow::Result<IndexingClient<RedisCompletionLog>> {
        let api_url = self
            .api_url
            .as_deref()
            .context("API_URL must be set for this command")?;
        let api_key = self
            .api_key
            .as_deref()
            .context("API_KEY must be set for this command")?;
        let completion = RedisCompletionLog::connect(&self.redis_url)
            .await
            .context("connecting to the completion cache")?;
        Ok(IndexingClient::new(api_url, api_key, completion))
    }

    fn qdrant_index(&self) -> QdrantIndex {
        QdrantIndex::new(
            &self.qdrant_url,
            &self.qdrant_collection,
            self.qdrant_api_key.clone(),
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        started_at = %Utc::now().to_rfc3339(),
        "story-index boot"
    );

    match &cli.command {
        Command::Ingest { input } => {
            let indexer = cli.indexing_client().await?;

            let documents = read_story_documents(input)
                .with_context(|| format!("reading documents from {}", input.display()))?;
            info!(documents = documents.len(), "ingesting story documents");

            let mut submitted = 0usize;
            let mut already_done = 0usize;
            let mut rejected = 0usize;

            for document in documents {
                let summary = ingest_story(&indexer, document.story_id, &document.doc_html)
                    .await
                    .with_context(|| format!("ingesting story {}", document.story_id))?;
                if summary.rejected > 0 {
                    warn!(
                        story_id = document.story_id,
                        rejected = summary.rejected,
                        "some chunks were rejected"
                    );
                }
                submitted += summary.submitted;
                already_done += summary.already_done;
                rejected += summary.rejected;
            }

            println!("submitted {submitted} chunks ({already_done} already done, {rejected} rejected)");
        }
        Command::Audit {
            shard,
            batch_size,
            output_dir,
        } => {
            let records = PostgresRecordStore::new(cli.pg_pool().await?);
            let index = cli.qdrant_index();

            let offset = i64::from(*shard) * i64::from(*batch_size);
            let story_ids = records
                .distinct_story_ids(offset, i64::from(*batch_size))
                .await?;
            info!(shard, stories = story_ids.len(), "auditing shard");

            let auditor = Auditor::new(records, index, RetryPolicy::default());
            let drifted = auditor.audit_batch(&story_ids).await?;

            let path = output_dir.join(format!("errors_{shard}.csv"));
            write_drift_report(&path, &drifted)
                .with_context(|| format!("writing drift report to {}", path.display()))?;

            println!(
                "{} of {} stories drifted, report written to {}",
                drifted.len(),
                story_ids.len(),
                path.display()
            );
        }
        Command::Repair { report } => {
            let records = PostgresRecordStore::new(cli.pg_pool().await?);
            let index = cli.qdrant_index();
            let indexer = cli.indexing_client().await?;

            let story_ids = read_drift_report(report)
                .with_context(|| format!("reading drift report from {}", report.display()))?;
            info!(stories = story_ids.len(), "repairing drifted stories");

            let engine = RepairEngine::new(records, index, indexer, RetryPolicy::default());
            let summary = engine.repair(&story_ids).await?;

            println!(
                "repaired {} stories: {} chunks resubmitted, {} already present, {} rejected",
                summary.stories, summary.resubmitted, summary.already_present, summary.rejected
            );
        }
    }

    Ok(())
}
