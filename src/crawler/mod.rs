//! Wikipedia crawling with per-topic quotas
//!
//! This module implements the sampling loop that harvests articles for each
//! topic and enriches them, in a fixed order, with:
//! extract → image → embedding → audio.
//!
//! A candidate without a summary, image or embedding is dropped. A missing
//! audio summary is tolerated. Nothing is retried; a failed request costs an
//! attempt (category listing) or drops the candidate (everything else).

pub mod fetcher;
pub mod pipeline;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use std::sync::Arc;

use crate::audio::{AudioSummaryProvider, AudioSummaryRequest};
use crate::config::{Config, CrawlConfig};
use crate::embedding::{article_embedding_input, Embedder};
use crate::models::{Article, ArticleData, AudioData, CrawlStats, TopicCategory};
use crate::utils::error::{CrawlerError, FetchError, SkipReason};
use crate::utils::{article_link, is_supported_image, truncate_summary};

use self::fetcher::{CategoryMember, WikiClient};

/// Result of one crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    /// Qualifying articles, in collection order
    pub articles: Vec<Article>,

    /// Counters for the run
    pub stats: CrawlStats,
}

/// Main crawler structure
pub struct WikiCrawler {
    /// Wikipedia API client
    wiki: WikiClient,

    /// Embedding provider
    embedder: Arc<dyn Embedder>,

    /// Audio summary provider
    audio: Arc<dyn AudioSummaryProvider>,

    /// Quotas and topic catalog
    config: CrawlConfig,

    /// Prefix for canonical article links
    article_base_url: String,

    /// Sampling RNG
    rng: ChaCha8Rng,
}

impl WikiCrawler {
    /// Create a new crawler
    ///
    /// # Errors
    ///
    /// Returns `CrawlerError::InvalidLimits` when the limits allow no request
    pub fn new(
        wiki: WikiClient,
        embedder: Arc<dyn Embedder>,
        audio: Arc<dyn AudioSummaryProvider>,
        config: CrawlConfig,
        article_base_url: impl Into<String>,
    ) -> Result<Self, CrawlerError> {
        if config.max_attempts == 0 || config.batch_size == 0 || config.sample_size == 0 {
            return Err(CrawlerError::InvalidLimits(format!(
                "max_attempts={}, batch_size={}, sample_size={}",
                config.max_attempts, config.batch_size, config.sample_size
            )));
        }

        let seed = config.seed.unwrap_or_else(rand::random);
        tracing::debug!(seed, "Seeding crawl sampler");

        Ok(Self {
            wiki,
            embedder,
            audio,
            config,
            article_base_url: article_base_url.into(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Build a crawler with the hosted embedding and summarization clients
    pub fn from_config(config: &Config) -> crate::error::Result<Self> {
        let wiki = WikiClient::new(&config.wikipedia)?;
        let embedder = Arc::new(crate::embedding::GeminiEmbedder::new(&config.embedding)?);
        let audio = Arc::new(crate::audio::AudioSummaryClient::new(&config.summarizer)?);

        Ok(Self::new(
            wiki,
            embedder,
            audio,
            config.crawl.clone(),
            config.wikipedia.article_base_url.clone(),
        )?)
    }

    /// Crawl every topic until quotas or the global cap are reached
    pub async fn crawl(&mut self) -> CrawlOutcome {
        let mut outcome = CrawlOutcome::default();
        let mut seen = HashSet::new();
        let topics = self.config.categories.clone();

        tracing::info!(
            topics = topics.len(),
            max_articles = self.config.max_articles,
            per_category = self.config.per_category_quota,
            "Starting crawl"
        );

        for topic in &topics {
            if outcome.articles.len() >= self.config.max_articles {
                tracing::info!("Global article cap reached");
                break;
            }

            self.crawl_topic(topic, &mut outcome, &mut seen).await;
        }

        tracing::info!(
            collected = outcome.articles.len(),
            attempts = outcome.stats.attempts,
            candidates = outcome.stats.candidates,
            missing_audio = outcome.stats.missing_audio,
            "Crawl finished"
        );

        outcome
    }

    /// Sample one topic
    async fn crawl_topic(
        &mut self,
        topic: &TopicCategory,
        outcome: &mut CrawlOutcome,
        seen: &mut HashSet<i64>,
    ) {
        let mut fetched = 0usize;
        let mut attempts = 0u32;

        while fetched < self.config.per_category_quota
            && attempts < self.config.max_attempts
            && outcome.articles.len() < self.config.max_articles
        {
            let Some(subcategory) = topic.subcategories.choose(&mut self.rng).cloned() else {
                tracing::warn!(topic = %topic.name, "Topic has no subcategories");
                return;
            };
            attempts += 1;
            outcome.stats.attempts += 1;

            let members = match self
                .wiki
                .category_members(&subcategory, self.config.batch_size)
                .await
            {
                Ok(members) => members,
                Err(e) => {
                    tracing::warn!(subcategory = %subcategory, error = %e, "Category request failed");
                    outcome.stats.failed_requests += 1;
                    continue;
                }
            };

            if members.is_empty() {
                tracing::info!("No articles found in Category:{subcategory}");
                outcome.stats.empty_categories += 1;
                continue;
            }

            let sample_size = self.config.sample_size.min(members.len());
            let sample: Vec<CategoryMember> = members
                .choose_multiple(&mut self.rng, sample_size)
                .cloned()
                .collect();

            for member in sample {
                if outcome.articles.len() >= self.config.max_articles
                    || fetched >= self.config.per_category_quota
                {
                    break;
                }

                outcome.stats.candidates += 1;
                match self
                    .build_article(&topic.name, &subcategory, &member.title, seen)
                    .await
                {
                    Ok(article) => {
                        if !article.has_audio() {
                            outcome.stats.missing_audio += 1;
                        }
                        tracing::info!(
                            article_id = article.article_id,
                            title = %member.title,
                            topic = %article.main_category(),
                            subcategory = %article.subcategory(),
                            "Fetched article"
                        );
                        seen.insert(article.article_id);
                        outcome.articles.push(article);
                        outcome.stats.collected += 1;
                        fetched += 1;
                    }
                    Err(CrawlerError::Skipped(reason)) => {
                        tracing::debug!(title = %member.title, %reason, "Skipping candidate");
                        outcome.stats.record_skip(&reason);
                    }
                    Err(e) => {
                        tracing::warn!(title = %member.title, error = %e, "Failed to process candidate");
                        outcome.stats.failed_requests += 1;
                    }
                }
            }
        }

        tracing::debug!(topic = %topic.name, fetched, attempts, "Topic done");
    }

    /// Qualify and enrich one candidate
    async fn build_article(
        &self,
        topic: &str,
        subcategory: &str,
        title: &str,
        seen: &HashSet<i64>,
    ) -> Result<Article, CrawlerError> {
        let page = self
            .wiki
            .page_summary(title)
            .await?
            .ok_or(CrawlerError::Skipped(SkipReason::MissingPage))?;

        // Duplicates count toward neither the topic quota nor the run cap
        if seen.contains(&page.page_id) {
            return Err(CrawlerError::Skipped(SkipReason::Duplicate));
        }

        let extract = page
            .extract
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .ok_or(CrawlerError::Skipped(SkipReason::NoSummary))?;
        let summary = truncate_summary(extract);

        let image_url = self
            .resolve_image(&page.image_titles)
            .await?
            .ok_or(CrawlerError::Skipped(SkipReason::NoImage))?;

        let tags = [topic.to_string(), subcategory.to_string()];
        let embedding_input = article_embedding_input(title, &summary, &tags);
        let article_embedding = match self.embedder.embed(&embedding_input).await {
            Ok(vector) if !vector.is_empty() => vector,
            Ok(_) => {
                tracing::warn!(page_id = page.page_id, title, "Empty embedding returned");
                return Err(CrawlerError::Skipped(SkipReason::NoEmbedding));
            }
            Err(e) => {
                tracing::warn!(page_id = page.page_id, title, error = %e, "Failed to get embedding");
                return Err(CrawlerError::Skipped(SkipReason::NoEmbedding));
            }
        };

        let audio_data = self.request_audio(page.page_id, title, &summary).await;

        Ok(Article {
            article_id: page.page_id,
            article_data: ArticleData {
                article_image: image_url,
                article_summary: summary,
                article_sub_tag: subcategory.to_string(),
                article_heading: title.to_string(),
                article_link: article_link(&self.article_base_url, title),
            },
            article_embedding,
            audio_data,
            tags,
        })
    }

    /// First supported image that resolves to a URL
    async fn resolve_image(&self, image_titles: &[String]) -> Result<Option<String>, FetchError> {
        for image_title in image_titles.iter().filter(|t| is_supported_image(t)) {
            if let Some(url) = self.wiki.image_url(image_title).await? {
                return Ok(Some(url));
            }
        }
        Ok(None)
    }

    /// Ask for an audio summary; failures only cost the audio
    async fn request_audio(&self, page_id: i64, title: &str, summary: &str) -> Option<AudioData> {
        let request = AudioSummaryRequest {
            article_id: page_id,
            article_title: title.to_string(),
            article_description: summary.to_string(),
        };

        match self.audio.audio_summary(&request).await {
            Ok(Some(audio)) => {
                tracing::debug!(page_id, file_url = %audio.file_url, "Audio summary attached");
                Some(audio)
            }
            Ok(None) => {
                tracing::warn!(page_id, title, "Summarization service returned no audio");
                None
            }
            Err(e) => {
                tracing::warn!(page_id, title, error = %e, "Failed to get audio summary");
                None
            }
        }
    }
}
