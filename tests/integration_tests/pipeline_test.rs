//! End-to-end pipeline tests: crawl, enrich, store

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use wikireel::crawler::pipeline::ContentPipeline;
use wikireel::error::{ClassifiedError, Error, StorageError};
use wikireel::models::Article;
use wikireel::scheduler::Scheduler;
use wikireel::storage::{ArticleRepository, MemoryArticleRepository};
use wiremock::MockServer;

use crate::common::*;

/// Repository whose backend is always down
struct UnavailableRepository;

#[async_trait]
impl ArticleRepository for UnavailableRepository {
    async fn upsert_articles(&self, _articles: &[Article]) -> Result<u64, StorageError> {
        Err(StorageError::Pool("connection refused".to_string()))
    }

    fn backend(&self) -> &'static str {
        "unavailable"
    }
}

async fn physics_server() -> MockServer {
    let server = MockServer::start().await;
    mount_category(&server, "Physics", &[(1, "Atom"), (2, "Photon"), (3, "Quark")]).await;
    mount_good_page(&server, 1, "Atom").await;
    mount_good_page(&server, 2, "Photon").await;
    mount_good_page(&server, 3, "Quark").await;
    server
}

fn pipeline(server: &MockServer, repository: Arc<dyn ArticleRepository>) -> ContentPipeline {
    let crawler = crawler(
        server,
        single_topic_config("Physics"),
        Arc::new(StaticEmbedder::default()),
        Arc::new(StaticAudio::ok()),
    );
    ContentPipeline::new(crawler, repository)
}

#[tokio::test]
async fn test_full_pipeline_stores_batch() {
    let server = physics_server().await;
    let repository = Arc::new(MemoryArticleRepository::new());
    let mut pipeline = pipeline(&server, repository.clone());

    let report = pipeline.run_once().await.unwrap();

    assert_eq!(report.fetched, 3);
    assert_eq!(report.inserted, 3);
    assert_eq!(report.stats.collected, 3);
    assert_eq!(repository.len().await, 3);

    let stored = repository.get(2).await.unwrap();
    assert_eq!(stored.article_data.article_heading, "Photon");
    assert!(stored.has_audio());
}

#[tokio::test]
async fn test_second_run_ignores_existing_ids() {
    let server = physics_server().await;
    let repository = Arc::new(MemoryArticleRepository::new());
    let mut pipeline = pipeline(&server, repository.clone());

    let first = pipeline.run_once().await.unwrap();
    let second = pipeline.run_once().await.unwrap();

    assert_eq!(first.inserted, 3);
    assert_eq!(second.fetched, 3);
    assert_eq!(second.inserted, 0);
    assert_ne!(first.run_id, second.run_id);
    assert_eq!(repository.len().await, 3);
}

#[tokio::test]
async fn test_empty_batch_skips_store() {
    let server = MockServer::start().await;
    mount_category(&server, "Physics", &[]).await;

    // Would fail if the upsert were attempted
    let mut pipeline = pipeline(&server, Arc::new(UnavailableRepository));
    let report = pipeline.run_once().await.unwrap();

    assert_eq!(report.fetched, 0);
    assert_eq!(report.inserted, 0);
    assert_eq!(report.stats.empty_categories, 3);
}

#[tokio::test]
async fn test_store_failure_fails_run() {
    let server = physics_server().await;
    let mut pipeline = pipeline(&server, Arc::new(UnavailableRepository));

    let err = pipeline.run_once().await.unwrap_err();

    assert!(matches!(err, Error::Storage(StorageError::Pool(_))));
    assert!(err.is_recoverable());
    assert_eq!(err.category().as_str(), "storage");
}

#[tokio::test]
async fn test_scheduled_run_on_startup() {
    let server = physics_server().await;
    let repository = Arc::new(MemoryArticleRepository::new());
    let pipeline = pipeline(&server, repository.clone());

    let scheduler = Scheduler::new(Duration::from_secs(3600), true);
    let stats = scheduler
        .run_until(pipeline, tokio::time::sleep(Duration::from_millis(200)))
        .await;

    // Shutdown waits for the in-flight run
    assert_eq!(stats.triggered, 1);
    assert_eq!(stats.failed, 0);
    assert_eq!(repository.len().await, 3);
}
