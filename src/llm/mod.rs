//! LLM client for article summarization
//!
//! This module provides summarization through an OpenAI-compatible
//! chat-completions API (Groq by default).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::utils::error::ProviderError;

const PROVIDER: &str = "groq";

/// Anything that can condense an article into a short summary
#[async_trait]
pub trait TextSummarizer: Send + Sync {
    /// Summarize an article from its title and description
    async fn summarize(&self, title: &str, description: &str) -> Result<String, ProviderError>;
}

/// Chat completion request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// System prompt fixing the summarizer's role and length limit
pub fn system_prompt(max_chars: usize) -> String {
    format!(
        "You are an intelligent summarizer for having mastery in beautifully summarizing \
         wikipedia articles in less than {max_chars} characters."
    )
}

/// User prompt for one article
pub fn user_prompt(title: &str, description: &str, max_chars: usize) -> String {
    format!(
        "Here's article title {title} and description {description}. \
         Summarize it in less than {max_chars} characters."
    )
}

/// Groq chat-completions client
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
    api_key: String,
}

impl LlmClient {
    /// Create a new LLM client
    ///
    /// # Errors
    ///
    /// Fails when no API key is configured or the HTTP client cannot be built
    pub fn new(config: &LlmConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ProviderError::missing(PROVIDER, "GROQ_KEY"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::http(PROVIDER, e))?;

        Ok(Self {
            client,
            config: config.clone(),
            api_key,
        })
    }

    /// Model name in use
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl TextSummarizer for LlmClient {
    async fn summarize(&self, title: &str, description: &str) -> Result<String, ProviderError> {
        let max_chars = self.config.max_summary_chars;
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt(max_chars),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt(title, description, max_chars),
                },
            ],
        };

        let url = format!(
            "{}/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        );

        tracing::debug!(model = %self.config.model, title, "Requesting summary");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::http(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(PROVIDER, response).await);
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::invalid(PROVIDER, e.to_string()))?;

        let summary = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        if summary.is_empty() {
            return Err(ProviderError::invalid(PROVIDER, "empty completion"));
        }

        Ok(summary)
    }
}
