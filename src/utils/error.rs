//! Error types for the wikireel pipeline
//!
//! This module defines the domain error types used throughout the application.

use thiserror::Error;

/// Errors that can occur while talking to the Wikipedia API
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Response body did not have the expected shape
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Map a reqwest error, keeping timeouts distinguishable
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

/// Reasons a sampled candidate does not make it into the output
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Page is missing or has no page id
    #[error("page missing")]
    MissingPage,

    /// Extract is empty
    #[error("no summary available")]
    NoSummary,

    /// No jpg/png/jpeg image resolved to a URL
    #[error("no qualifying image")]
    NoImage,

    /// Embedding provider failed or returned an empty vector
    #[error("embedding unavailable")]
    NoEmbedding,

    /// Page was already collected during this run
    #[error("duplicate page")]
    Duplicate,
}

/// General crawler errors
#[derive(Error, Debug)]
pub enum CrawlerError {
    /// Fetch error
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Candidate was dropped
    #[error("Candidate skipped: {0}")]
    Skipped(SkipReason),

    /// Crawl limits make no progress possible
    #[error("Invalid crawl limits: {0}")]
    InvalidLimits(String),
}

/// Errors returned by the hosted vendor APIs (embedding, LLM, TTS, upload,
/// summarization service)
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Transport-level failure
    #[error("{provider} request failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status
    #[error("{provider} returned status {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// Response did not contain what we needed
    #[error("{provider} returned an invalid response: {message}")]
    InvalidResponse {
        provider: &'static str,
        message: String,
    },

    /// A credential needed to call the provider is not configured
    #[error("{provider} credential missing: {name}")]
    MissingCredential {
        provider: &'static str,
        name: &'static str,
    },
}

impl ProviderError {
    /// Wrap a reqwest error for the given provider
    pub fn http(provider: &'static str, source: reqwest::Error) -> Self {
        Self::Http { provider, source }
    }

    /// Build an invalid-response error
    pub fn invalid(provider: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider,
            message: message.into(),
        }
    }

    /// Build a missing-credential error
    pub fn missing(provider: &'static str, name: &'static str) -> Self {
        Self::MissingCredential { provider, name }
    }

    /// Turn a non-success response into an error, consuming its body
    pub async fn from_response(provider: &'static str, response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Self::Status {
            provider,
            status,
            body,
        }
    }
}

/// Errors from the summarize → speak → upload chain
#[derive(Error, Debug)]
pub enum ServiceError {
    /// A vendor call failed
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The LLM produced no text
    #[error("empty summary")]
    EmptySummary,

    /// The speech synthesizer returned no audio
    #[error("empty audio stream")]
    EmptyAudio,
}

/// Errors raised by the article repositories
#[derive(Error, Debug)]
pub enum StorageError {
    /// PostgreSQL error
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// Connection pool error
    #[error("Connection pool error: {0}")]
    Pool(String),

    /// REST gateway error
    #[error("REST gateway error: {0}")]
    Rest(#[from] ProviderError),

    /// Row could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend not configured
    #[error("No article store configured: {0}")]
    NotConfigured(String),
}

impl From<deadpool_postgres::PoolError> for StorageError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

impl From<deadpool_postgres::CreatePoolError> for StorageError {
    fn from(err: deadpool_postgres::CreatePoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
