//! Article persistence
//!
//! Articles go to PostgreSQL directly or through a PostgREST gateway,
//! whichever is configured. Both ignore rows whose `article_id` exists.

pub mod repository;

use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::utils::error::StorageError;

pub use repository::{
    validate_table_name, ArticleRepository, MemoryArticleRepository, PostgresArticleRepository,
    RestArticleRepository, SharedArticleRepository,
};

/// Open the configured article store
///
/// A PostgreSQL URL takes precedence over the PostgREST settings.
pub async fn connect(config: &DatabaseConfig) -> Result<SharedArticleRepository, StorageError> {
    if let Some(url) = config.postgres_url.as_deref() {
        let repo = PostgresArticleRepository::new(url, &config.table, config.pool_size)?;
        if config.create_schema {
            repo.ensure_schema().await?;
        }
        tracing::info!(backend = "postgres", table = %config.table, "Article store ready");
        return Ok(Arc::new(repo));
    }

    match (config.supabase_url.as_deref(), config.supabase_key.as_deref()) {
        (Some(url), Some(key)) => {
            let repo = RestArticleRepository::new(url, key, &config.table)?;
            tracing::info!(backend = "postgrest", table = %config.table, "Article store ready");
            Ok(Arc::new(repo))
        }
        (Some(_), None) => Err(StorageError::NotConfigured(
            "SUPABASE_KEY is required with SUPABASE_URL".to_string(),
        )),
        _ => Err(StorageError::NotConfigured(
            "set DATABASE_URL or SUPABASE_URL/SUPABASE_KEY".to_string(),
        )),
    }
}
