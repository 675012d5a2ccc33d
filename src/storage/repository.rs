//! Repository Pattern for article persistence
//!
//! The pipeline only ever writes, and only with insert-or-ignore semantics
//! keyed by `article_id`. Backends:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  crawler::pipeline                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  ArticleRepository                          │
//! └─────────────────────────────────────────────────────────────┘
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │   PostgreSQL    │ │    PostgREST    │ │    In-memory    │
//! │   (pgvector)    │ │   (Supabase)    │ │    (testing)    │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use deadpool_postgres::{Config as PoolConfig, ManagerConfig, Pool, RecyclingMethod, Runtime};
use pgvector::Vector;
use reqwest::Client;
use tokio::sync::RwLock;
use tokio_postgres::NoTls;

use crate::models::Article;
use crate::utils::error::{ProviderError, StorageError};

const REST_PROVIDER: &str = "postgrest";

// ============================================================================
// Repository Trait
// ============================================================================

/// Write side of the article table
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Insert articles, ignoring ids that already exist
    ///
    /// Returns the number of rows actually inserted.
    async fn upsert_articles(&self, articles: &[Article]) -> Result<u64, StorageError>;

    /// Short backend name for logs
    fn backend(&self) -> &'static str;
}

/// Shared repository handle
pub type SharedArticleRepository = Arc<dyn ArticleRepository>;

/// Check a (optionally schema-qualified) table name before it is spliced into SQL
pub fn validate_table_name(table: &str) -> Result<(), StorageError> {
    let valid_part = |part: &str| {
        let mut chars = part.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    };

    let parts: Vec<&str> = table.split('.').collect();
    if parts.len() > 2 || !parts.iter().all(|p| valid_part(p)) {
        return Err(StorageError::NotConfigured(format!(
            "invalid table name: {table:?}"
        )));
    }
    Ok(())
}

// ============================================================================
// PostgreSQL Implementation
// ============================================================================

/// PostgreSQL repository using a deadpool connection pool
pub struct PostgresArticleRepository {
    pool: Pool,
    table: String,
}

impl PostgresArticleRepository {
    /// Create a pooled repository
    ///
    /// No connection is opened until the first query.
    pub fn new(url: &str, table: &str, pool_size: usize) -> Result<Self, StorageError> {
        validate_table_name(table)?;

        let mut cfg = PoolConfig::new();
        cfg.url = Some(url.to_string());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        cfg.pool = Some(deadpool_postgres::PoolConfig::new(pool_size));

        let pool = cfg.create_pool(Some(Runtime::Tokio1), NoTls)?;

        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }

    /// Create the vector extension and the article table if absent
    pub async fn ensure_schema(&self) -> Result<(), StorageError> {
        let client = self.pool.get().await?;
        client
            .batch_execute(&format!(
                r#"
                CREATE EXTENSION IF NOT EXISTS vector;
                CREATE TABLE IF NOT EXISTS {table} (
                    article_id BIGINT PRIMARY KEY,
                    article_data JSONB NOT NULL,
                    article_embedding VECTOR NOT NULL,
                    audio_data JSONB,
                    tags TEXT[] NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
                );
                "#,
                table = self.table
            ))
            .await?;

        tracing::info!(table = %self.table, "PostgreSQL schema ensured");
        Ok(())
    }
}

#[async_trait]
impl ArticleRepository for PostgresArticleRepository {
    async fn upsert_articles(&self, articles: &[Article]) -> Result<u64, StorageError> {
        if articles.is_empty() {
            return Ok(0);
        }

        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;
        let stmt = tx
            .prepare(&format!(
                "INSERT INTO {} (article_id, article_data, article_embedding, audio_data, tags) \
                 VALUES ($1, $2, $3, $4, $5) \
                 ON CONFLICT (article_id) DO NOTHING",
                self.table
            ))
            .await?;

        let mut inserted = 0;
        for article in articles {
            let article_data = serde_json::to_value(&article.article_data)?;
            let audio_data = article
                .audio_data
                .as_ref()
                .map(serde_json::to_value)
                .transpose()?;
            let embedding = Vector::from(article.article_embedding.clone());
            let tags = article.tags.to_vec();

            inserted += tx
                .execute(
                    &stmt,
                    &[
                        &article.article_id,
                        &article_data,
                        &embedding,
                        &audio_data,
                        &tags,
                    ],
                )
                .await?;
        }

        tx.commit().await?;

        tracing::debug!(
            table = %self.table,
            submitted = articles.len(),
            inserted,
            "PostgreSQL upsert committed"
        );
        Ok(inserted)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

// ============================================================================
// PostgREST Implementation
// ============================================================================

/// Repository writing through a PostgREST gateway (e.g. Supabase)
pub struct RestArticleRepository {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl RestArticleRepository {
    /// Create a REST repository
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Result<Self, StorageError> {
        validate_table_name(table)?;

        let client = Client::builder()
            .build()
            .map_err(|e| ProviderError::http(REST_PROVIDER, e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }
}

#[async_trait]
impl ArticleRepository for RestArticleRepository {
    async fn upsert_articles(&self, articles: &[Article]) -> Result<u64, StorageError> {
        if articles.is_empty() {
            return Ok(0);
        }

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("on_conflict", "article_id")])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "resolution=ignore-duplicates,return=representation")
            .json(articles)
            .send()
            .await
            .map_err(|e| ProviderError::http(REST_PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(REST_PROVIDER, response)
                .await
                .into());
        }

        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| ProviderError::invalid(REST_PROVIDER, e.to_string()))?;

        tracing::debug!(
            table = %self.table,
            submitted = articles.len(),
            inserted = rows.len(),
            "PostgREST upsert accepted"
        );
        Ok(rows.len() as u64)
    }

    fn backend(&self) -> &'static str {
        "postgrest"
    }
}

// ============================================================================
// In-memory Implementation (for testing and dry runs)
// ============================================================================

/// In-memory repository with the same insert-or-ignore semantics
#[derive(Default)]
pub struct MemoryArticleRepository {
    articles: RwLock<HashMap<i64, Article>>,
}

impl MemoryArticleRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored articles
    pub async fn len(&self) -> usize {
        self.articles.read().await.len()
    }

    /// Whether nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.articles.read().await.is_empty()
    }

    /// Stored article by id
    pub async fn get(&self, article_id: i64) -> Option<Article> {
        self.articles.read().await.get(&article_id).cloned()
    }
}

#[async_trait]
impl ArticleRepository for MemoryArticleRepository {
    async fn upsert_articles(&self, articles: &[Article]) -> Result<u64, StorageError> {
        let mut store = self.articles.write().await;
        let mut inserted = 0;
        for article in articles {
            if !store.contains_key(&article.article_id) {
                store.insert(article.article_id, article.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
