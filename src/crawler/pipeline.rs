//! Crawl-then-store pipeline job
//!
//! One run of the pipeline crawls every topic, then upserts the collected
//! batch into the article store.
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Wikipedia  │     │  Enrichment │     │   Article   │
//! │   Sampling  │────▶│ (embedding, │────▶│  Repository │
//! │             │     │    audio)   │     │   (upsert)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```

use async_trait::async_trait;
use serde::Serialize;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::config::Config;
use crate::crawler::WikiCrawler;
use crate::error::Result;
use crate::models::CrawlStats;
use crate::scheduler::ScheduledJob;
use crate::storage::SharedArticleRepository;

/// Summary of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Run identifier used in log fields
    pub run_id: Uuid,

    /// Articles collected by the crawl
    pub fetched: usize,

    /// Rows actually inserted (duplicates excluded)
    pub inserted: u64,

    /// Wall-clock duration of the run
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,

    /// Crawl counters
    pub stats: CrawlStats,
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }
}

/// Crawler plus article store
pub struct ContentPipeline {
    crawler: WikiCrawler,
    repository: SharedArticleRepository,
}

impl ContentPipeline {
    /// Create a pipeline from its parts
    pub fn new(crawler: WikiCrawler, repository: SharedArticleRepository) -> Self {
        Self {
            crawler,
            repository,
        }
    }

    /// Build the crawler and connect the configured store
    pub async fn from_config(config: &Config) -> Result<Self> {
        let crawler = WikiCrawler::from_config(config)?;
        let repository = crate::storage::connect(&config.database).await?;
        Ok(Self::new(crawler, repository))
    }

    /// Crawl once and upsert the batch
    pub async fn run_once(&mut self) -> Result<PipelineReport> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        tracing::info!(%run_id, backend = self.repository.backend(), "Pipeline run started");

        let outcome = self.crawler.crawl().await;
        let fetched = outcome.articles.len();

        let inserted = if outcome.articles.is_empty() {
            tracing::warn!(%run_id, "No articles collected, skipping upsert");
            0
        } else {
            let inserted = self.repository.upsert_articles(&outcome.articles).await?;
            tracing::info!(
                %run_id,
                fetched,
                inserted,
                ignored = (fetched as u64).saturating_sub(inserted),
                "Articles upserted"
            );
            inserted
        };

        let elapsed = started.elapsed();
        tracing::info!(
            %run_id,
            fetched,
            inserted,
            elapsed_secs = elapsed.as_secs_f64(),
            acceptance_rate = outcome.stats.acceptance_rate(),
            "Pipeline run finished"
        );

        Ok(PipelineReport {
            run_id,
            fetched,
            inserted,
            elapsed,
            stats: outcome.stats,
        })
    }
}

#[async_trait]
impl ScheduledJob for ContentPipeline {
    fn name(&self) -> &str {
        "content-pipeline"
    }

    async fn run(&mut self) -> Result<()> {
        self.run_once().await.map(|_| ())
    }
}
