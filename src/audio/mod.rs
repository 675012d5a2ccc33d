//! Client for the summarization service
//!
//! The crawler asks the service for a spoken summary of each article and
//! keeps whatever `data.audio_data` comes back. Audio is optional, so the
//! pipeline treats every failure here as "no audio".

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::SummarizerClientConfig;
use crate::models::AudioData;
use crate::utils::error::ProviderError;

const PROVIDER: &str = "summarization-service";

/// Request body of `POST /summarize`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSummaryRequest {
    pub article_id: i64,
    pub article_title: String,
    pub article_description: String,
}

#[derive(Debug, Deserialize)]
struct SummarizeEnvelope {
    data: Option<SummarizeData>,
}

#[derive(Debug, Deserialize)]
struct SummarizeData {
    audio_data: Option<AudioData>,
}

/// Source of audio summaries for articles
#[async_trait]
pub trait AudioSummaryProvider: Send + Sync {
    /// Request an audio summary; `Ok(None)` when the service had none
    async fn audio_summary(
        &self,
        request: &AudioSummaryRequest,
    ) -> Result<Option<AudioData>, ProviderError>;
}

/// HTTP client for the summarization service
pub struct AudioSummaryClient {
    client: Client,
    url: String,
}

impl AudioSummaryClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Fails when the service URL is not configured
    pub fn new(config: &SummarizerClientConfig) -> Result<Self, ProviderError> {
        let base_url = config
            .base_url
            .as_deref()
            .ok_or_else(|| ProviderError::missing(PROVIDER, "SUMMARIZATION_SERVICE_URL"))?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::http(PROVIDER, e))?;

        Ok(Self {
            client,
            url: format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                config.endpoint.trim_start_matches('/')
            ),
        })
    }

    /// Full URL requests are sent to
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AudioSummaryProvider for AudioSummaryClient {
    async fn audio_summary(
        &self,
        request: &AudioSummaryRequest,
    ) -> Result<Option<AudioData>, ProviderError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::http(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(PROVIDER, response).await);
        }

        let envelope: SummarizeEnvelope = response
            .json()
            .await
            .map_err(|e| ProviderError::invalid(PROVIDER, e.to_string()))?;

        Ok(envelope.data.and_then(|d| d.audio_data))
    }
}
