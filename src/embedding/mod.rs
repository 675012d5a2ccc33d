//! Vector embedding generation
//!
//! This module turns article text into a fixed-length vector through a
//! hosted embedding endpoint (Gemini `embedContent`).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use crate::config::EmbeddingConfig;
use crate::utils::error::ProviderError;

const PROVIDER: &str = "gemini-embedding";

/// Anything that can embed a piece of text
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed `text` into a vector
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;
}

/// Build the text embedded for an article
///
/// The embedding covers the heading, the summary and both tags, serialized
/// as one JSON object.
pub fn article_embedding_input(heading: &str, summary: &str, tags: &[String; 2]) -> String {
    json!({
        "heading": heading,
        "summary": summary,
        "tags": tags,
    })
    .to_string()
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest<'a> {
    model: String,
    content: EmbedContent<'a>,
}

#[derive(Debug, Serialize)]
struct EmbedContent<'a> {
    parts: [EmbedPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct EmbedPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: Option<EmbeddingValues>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    #[serde(default)]
    values: Vec<f32>,
}

/// Gemini text-embedding client
pub struct GeminiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiEmbedder {
    /// Create a new embedder
    ///
    /// # Errors
    ///
    /// Fails when no API key is configured or the HTTP client cannot be built
    pub fn new(config: &EmbeddingConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ProviderError::missing(PROVIDER, "GEMINI_KEY"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::http(PROVIDER, e))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    /// Model name in use
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let url = format!("{}/models/{}:embedContent", self.endpoint, self.model);
        let request = EmbedContentRequest {
            model: format!("models/{}", self.model),
            content: EmbedContent {
                parts: [EmbedPart { text }],
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::http(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(PROVIDER, response).await);
        }

        let body: EmbedContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::invalid(PROVIDER, e.to_string()))?;

        let values = body.embedding.map(|e| e.values).unwrap_or_default();
        if values.is_empty() {
            return Err(ProviderError::invalid(PROVIDER, "empty embedding"));
        }

        tracing::trace!(dimension = values.len(), model = %self.model, "Embedded text");
        Ok(values)
    }
}
