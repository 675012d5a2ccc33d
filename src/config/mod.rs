//! Configuration management for wikireel
//!
//! This module handles loading and validating configuration from environment variables,
//! files, and command-line arguments.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::models::TopicCategory;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Wikipedia API access
    pub wikipedia: WikipediaConfig,

    /// Sampling quotas and topic catalog
    pub crawl: CrawlConfig,

    /// Embedding provider
    pub embedding: EmbeddingConfig,

    /// Client side of the summarization service
    pub summarizer: SummarizerClientConfig,

    /// Article database
    pub database: DatabaseConfig,

    /// Periodic crawl schedule
    pub schedule: ScheduleConfig,

    /// LLM used by the summarization service
    pub llm: LlmConfig,

    /// Text-to-speech used by the summarization service
    pub speech: SpeechConfig,

    /// Object storage for generated audio
    pub media: MediaConfig,

    /// Summarization HTTP server
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Wikipedia API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WikipediaConfig {
    /// Action API endpoint
    pub api_url: String,

    /// Prefix for canonical article links
    pub article_base_url: String,

    /// User agent string
    pub user_agent: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Rate limit (requests per second)
    pub requests_per_second: u32,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            api_url: String::from("https://en.wikipedia.org/w/api.php"),
            article_base_url: String::from("https://en.wikipedia.org/wiki/"),
            user_agent: String::from("WikipediaScraper/1.0 (contact@wikitok.com)"),
            request_timeout_secs: 10,
            requests_per_second: 5,
        }
    }
}

impl WikipediaConfig {
    /// Per-request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Crawl quotas
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Articles to collect per topic
    pub per_category_quota: usize,

    /// Category fetches allowed per topic
    pub max_attempts: u32,

    /// Global cap across all topics
    pub max_articles: usize,

    /// `cmlimit` for category member listing
    pub batch_size: u32,

    /// Candidates sampled from each member batch
    pub sample_size: usize,

    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,

    /// Topic catalog
    pub categories: Vec<TopicCategory>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            per_category_quota: 4,
            max_attempts: 20,
            max_articles: 26,
            batch_size: 20,
            sample_size: 6,
            seed: None,
            categories: TopicCategory::catalog(),
        }
    }
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// API base (models are addressed below it)
    pub endpoint: String,

    /// Embedding model name
    pub model: String,

    /// API key
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from("https://generativelanguage.googleapis.com/v1beta"),
            model: String::from("text-embedding-004"),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

/// Where the crawler asks for audio summaries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerClientConfig {
    /// Base URL of the summarization service
    pub base_url: Option<String>,

    /// Route below the base URL
    pub endpoint: String,

    /// Optional request timeout in seconds (none by default)
    pub timeout_secs: Option<u64>,
}

impl Default for SummarizerClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            endpoint: String::from("summarize"),
            timeout_secs: None,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string
    pub postgres_url: Option<String>,

    /// PostgREST gateway URL (Supabase project URL)
    pub supabase_url: Option<String>,

    /// PostgREST service key
    pub supabase_key: Option<String>,

    /// Target table
    pub table: String,

    /// Maximum pool size
    pub pool_size: usize,

    /// Create the table (and vector extension) on connect
    pub create_schema: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            postgres_url: None,
            supabase_url: None,
            supabase_key: None,
            table: String::from("articles"),
            pool_size: 4,
            create_schema: false,
        }
    }
}

/// Schedule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Minutes between crawl runs
    pub interval_minutes: u64,

    /// Run once immediately on startup
    pub run_on_startup: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 25,
            run_on_startup: true,
        }
    }
}

impl ScheduleConfig {
    /// Longest accepted gap between runs (one week)
    pub const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

    /// Interval between runs, clamped to `MAX_INTERVAL_MINUTES`
    #[must_use]
    pub fn interval(&self) -> Duration {
        let minutes = self.interval_minutes.min(Self::MAX_INTERVAL_MINUTES);
        Duration::from_secs(minutes * 60)
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible API base
    pub endpoint: String,

    /// Model name to use
    pub model: String,

    /// API key
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Upper bound stated in the summarization prompt
    pub max_summary_chars: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from("https://api.groq.com/openai/v1"),
            model: String::from("llama-3.3-70b-versatile"),
            api_key: None,
            timeout_secs: 60,
            max_summary_chars: 250,
        }
    }
}

/// Text-to-speech configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Endpoint override; derived from the region when unset
    pub endpoint: Option<String>,

    /// Service region
    pub region: String,

    /// Access key id
    pub access_key_id: Option<String>,

    /// Secret access key
    pub secret_access_key: Option<String>,

    /// Voice used unless `random_voice` is set
    pub voice_id: String,

    /// Pick a voice from the pool for each request
    pub random_voice: bool,

    /// Audio container format
    pub output_format: String,

    /// Synthesis engine (`standard` or `neural`)
    pub engine: String,

    /// Language code for the text
    pub language_code: String,

    /// Sample rate in Hz, as a string
    pub sample_rate: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: String::from("us-west-2"),
            access_key_id: None,
            secret_access_key: None,
            voice_id: String::from("Joanna"),
            random_voice: false,
            output_format: String::from("mp3"),
            engine: String::from("standard"),
            language_code: String::from("en-IN"),
            sample_rate: String::from("22050"),
            timeout_secs: 60,
        }
    }
}

impl SpeechConfig {
    /// Effective endpoint URL
    pub fn endpoint_url(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://polly.{}.amazonaws.com", self.region))
    }
}

/// Object storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Upload API base
    pub api_base: String,

    /// Cloud name
    pub cloud_name: Option<String>,

    /// Unsigned upload preset
    pub upload_preset: String,

    /// Resource type sent with the upload
    pub resource_type: String,

    /// Destination folder
    pub folder: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            api_base: String::from("https://api.cloudinary.com"),
            cloud_name: None,
            upload_preset: String::from("ml_default"),
            resource_type: String::from("audio"),
            folder: Some(String::from("summary_audio_files")),
            timeout_secs: 60,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub bind_address: String,

    /// Enable permissive CORS
    pub enable_cors: bool,

    /// Enable request tracing
    pub enable_request_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: String::from("0.0.0.0:5000"),
            enable_cors: true,
            enable_request_logging: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    /// Overlay environment variables on top of the current values
    pub fn apply_env(&mut self) {
        if let Some(v) = env_string("WIKIREEL_WIKI_API_URL") {
            self.wikipedia.api_url = v;
        }
        if let Some(v) = env_string("WIKIREEL_USER_AGENT") {
            self.wikipedia.user_agent = v;
        }
        if let Some(v) = env_parse("WIKIREEL_REQUEST_TIMEOUT") {
            self.wikipedia.request_timeout_secs = v;
        }
        if let Some(v) = env_parse("WIKIREEL_RATE_LIMIT") {
            self.wikipedia.requests_per_second = v;
        }
        if let Some(v) = env_parse("WIKIREEL_MAX_ARTICLES") {
            self.crawl.max_articles = v;
        }
        if let Some(v) = env_parse("WIKIREEL_SEED") {
            self.crawl.seed = Some(v);
        }

        if let Some(v) = env_string("GEMINI_KEY") {
            self.embedding.api_key = Some(v);
        }
        if let Some(v) = env_string("WIKIREEL_EMBEDDING_MODEL") {
            self.embedding.model = v;
        }

        if let Some(v) = env_string("SUMMARIZATION_SERVICE_URL") {
            self.summarizer.base_url = Some(v);
        }
        if let Some(v) = env_string("SUMMARIZATION_SERVICE_ENDPOINT") {
            self.summarizer.endpoint = v;
        }

        if let Some(v) = env_string("DATABASE_URL").or_else(|| env_string("POSTGRES_URL")) {
            self.database.postgres_url = Some(v);
        }
        if let Some(v) = env_string("SUPABASE_URL") {
            self.database.supabase_url = Some(v);
        }
        if let Some(v) = env_string("SUPABASE_KEY") {
            self.database.supabase_key = Some(v);
        }

        if let Some(v) = env_parse("WIKIREEL_SCHEDULE_MINUTES") {
            self.schedule.interval_minutes = v;
        }

        if let Some(v) = env_string("GROQ_KEY") {
            self.llm.api_key = Some(v);
        }
        if let Some(v) = env_string("WIKIREEL_LLM_MODEL") {
            self.llm.model = v;
        }

        if let Some(v) = env_string("AWS_ACCESS_KEY") {
            self.speech.access_key_id = Some(v);
        }
        if let Some(v) = env_string("AWS_SECRET_KEY") {
            self.speech.secret_access_key = Some(v);
        }
        if let Some(v) = env_string("REGION_NAME") {
            self.speech.region = v;
        }

        if let Some(v) = env_string("CLOUDINARY_CLOUD_NAME") {
            self.media.cloud_name = Some(v);
        }

        if let Some(v) = env_string("WIKIREEL_BIND_ADDRESS") {
            self.server.bind_address = v;
        }

        if let Some(v) = env_string("WIKIREEL_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = env_string("WIKIREEL_LOG_FORMAT") {
            self.logging.format = v;
        }
    }

    /// Load configuration from a file, then overlay environment variables
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        config.apply_env();
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.wikipedia.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.wikipedia.requests_per_second == 0 {
            anyhow::bail!("requests_per_second must be greater than 0");
        }

        if self.crawl.max_attempts == 0 || self.crawl.batch_size == 0 {
            anyhow::bail!("max_attempts and batch_size must be greater than 0");
        }

        if self.crawl.sample_size == 0 {
            anyhow::bail!("sample_size must be greater than 0");
        }

        if self
            .crawl
            .categories
            .iter()
            .any(|topic| topic.subcategories.is_empty())
        {
            anyhow::bail!("every topic needs at least one subcategory");
        }

        if self.schedule.interval_minutes == 0 {
            anyhow::bail!("interval_minutes must be greater than 0");
        }

        if self.schedule.interval_minutes > ScheduleConfig::MAX_INTERVAL_MINUTES {
            anyhow::bail!(
                "interval_minutes must be at most {}",
                ScheduleConfig::MAX_INTERVAL_MINUTES
            );
        }

        if self.database.pool_size == 0 {
            anyhow::bail!("pool_size must be greater than 0");
        }

        self.bind_address()?;

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("log format must be 'text' or 'json'");
        }

        Ok(())
    }

    /// Parse the server bind address
    pub fn bind_address(&self) -> Result<SocketAddr> {
        self.server
            .bind_address
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.server.bind_address))
    }
}
