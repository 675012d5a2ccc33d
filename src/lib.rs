//! wikireel - Wikipedia article pipeline with spoken summaries
//!
//! Harvests Wikipedia articles across a fixed set of topics, enriches each
//! with an embedding and an audio summary, and upserts them into Postgres.
//! A companion web service produces the audio summaries.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - Topic sampling, qualification and the pipeline job
//! - [`embedding`] - Hosted text embeddings
//! - [`audio`] - Client for the summarization service
//! - [`storage`] - Article repositories (PostgreSQL, PostgREST, in-memory)
//! - [`scheduler`] - Fixed-interval runs without overlap
//! - [`service`] - Summarization web service
//! - [`llm`], [`tts`], [`media`] - Vendor clients used by the service
//! - [`models`] - Core data structures and types
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use wikireel::config::Config;
//! use wikireel::crawler::pipeline::ContentPipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let mut pipeline = ContentPipeline::from_config(&config).await?;
//!     let report = pipeline.run_once().await?;
//!     println!("inserted {} of {}", report.inserted, report.fetched);
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod config;
pub mod crawler;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod media;
pub mod models;
pub mod scheduler;
pub mod service;
pub mod storage;
pub mod tts;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::pipeline::{ContentPipeline, PipelineReport};
    pub use crate::crawler::{CrawlOutcome, WikiCrawler};
    pub use crate::error::{ClassifiedError, Error, ErrorCategory, Result};
    pub use crate::models::{Article, ArticleData, AudioData, CrawlStats, TopicCategory};
    pub use crate::scheduler::{ScheduledJob, Scheduler};
    pub use crate::service::{SummarizationService, SummaryServer};
    pub use crate::storage::{ArticleRepository, SharedArticleRepository};
}

// Direct re-exports for convenience
pub use models::{Article, AudioData, CrawlStats};
