//! Summarization web service
//!
//! Turns an article into a short spoken summary:
//!
//! ```text
//! title + description ──▶ LLM summary ──▶ speech ──▶ upload ──▶ AudioData
//! ```
//!
//! - [`api`] - Routes and handlers
//! - [`server`] - HTTP server with graceful shutdown

pub mod api;
pub mod server;

use std::sync::Arc;

use crate::config::Config;
use crate::llm::{LlmClient, TextSummarizer};
use crate::media::{AudioUploader, CloudinaryUploader};
use crate::models::AudioData;
use crate::tts::{PollySynthesizer, SpeechSynthesizer};
use crate::utils::error::ServiceError;

pub use api::create_router;
pub use server::{ServerError, SummaryServer};

/// The summarize → speak → upload chain
#[derive(Clone)]
pub struct SummarizationService {
    summarizer: Arc<dyn TextSummarizer>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    uploader: Arc<dyn AudioUploader>,
    audio_format: String,
}

impl SummarizationService {
    /// Create a service from its three stages
    pub fn new(
        summarizer: Arc<dyn TextSummarizer>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        uploader: Arc<dyn AudioUploader>,
        audio_format: impl Into<String>,
    ) -> Self {
        Self {
            summarizer,
            synthesizer,
            uploader,
            audio_format: audio_format.into(),
        }
    }

    /// Build the hosted Groq / Polly / Cloudinary chain
    pub fn from_config(config: &Config) -> crate::error::Result<Self> {
        Ok(Self::new(
            Arc::new(LlmClient::new(&config.llm)?),
            Arc::new(PollySynthesizer::new(&config.speech)?),
            Arc::new(CloudinaryUploader::new(&config.media)?),
            config.speech.output_format.clone(),
        ))
    }

    /// Produce and upload an audio summary for one article
    pub async fn summarize_article(
        &self,
        article_key: &str,
        title: &str,
        description: &str,
    ) -> Result<AudioData, ServiceError> {
        let summary = self.summarizer.summarize(title, description).await?;
        if summary.trim().is_empty() {
            return Err(ServiceError::EmptySummary);
        }
        tracing::debug!(article = article_key, chars = summary.chars().count(), "Summary generated");

        let audio = self.synthesizer.synthesize(&summary).await?;
        if audio.is_empty() {
            return Err(ServiceError::EmptyAudio);
        }
        tracing::debug!(article = article_key, bytes = audio.len(), "Speech synthesized");

        let file_name = format!("article_{article_key}.{}", self.audio_format);
        Ok(self.uploader.upload(audio, &file_name).await?)
    }
}
