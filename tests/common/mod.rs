//! Common test utilities

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wikireel::audio::{AudioSummaryProvider, AudioSummaryRequest};
use wikireel::config::CrawlConfig;
use wikireel::crawler::fetcher::WikiClient;
use wikireel::crawler::WikiCrawler;
use wikireel::embedding::Embedder;
use wikireel::llm::TextSummarizer;
use wikireel::media::AudioUploader;
use wikireel::models::{Article, ArticleData, AudioData, TopicCategory};
use wikireel::tts::SpeechSynthesizer;
use wikireel::utils::error::ProviderError;

pub const API_PATH: &str = "/w/api.php";
pub const ARTICLE_BASE: &str = "https://en.wikipedia.org/wiki/";

/// Create a test article with default values
pub fn create_test_article(id: i64) -> Article {
    Article {
        article_id: id,
        article_data: ArticleData {
            article_image: format!("https://upload.wikimedia.org/{id}.jpg"),
            article_summary: "A test summary.".to_string(),
            article_sub_tag: "Physics".to_string(),
            article_heading: format!("Article {id}"),
            article_link: format!("{ARTICLE_BASE}Article_{id}"),
        },
        article_embedding: vec![0.1, 0.2, 0.3],
        audio_data: Some(sample_audio_data()),
        tags: ["Physics & Chemistry".to_string(), "Physics".to_string()],
    }
}

/// Upload metadata as the object store returns it
pub fn sample_audio_data() -> AudioData {
    AudioData {
        file_url: "https://res.cloudinary.com/demo/video/upload/v1/summary_audio_files/a.mp3"
            .to_string(),
        file_public_id: Some("summary_audio_files/a".to_string()),
        file_format: Some("mp3".to_string()),
        duration: Some(11.2),
        file_size: Some(44_912),
        technical: Some(json!({"codec": "mp3", "frequency": 22050})),
    }
}

// ============================================================================
// Fake providers
// ============================================================================

/// Embedder returning a fixed vector, failing for listed headings
#[derive(Default)]
pub struct StaticEmbedder {
    pub fail_for: Vec<String>,
    pub calls: AtomicUsize,
}

impl StaticEmbedder {
    pub fn failing_for(titles: &[&str]) -> Self {
        Self {
            fail_for: titles.iter().map(|t| t.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Embedder for StaticEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let input: Value = serde_json::from_str(text)
            .map_err(|e| ProviderError::invalid("static", e.to_string()))?;
        let heading = input["heading"].as_str().unwrap_or_default();
        if self.fail_for.iter().any(|t| t == heading) {
            return Err(ProviderError::Status {
                provider: "static",
                status: 500,
                body: "embedding backend down".to_string(),
            });
        }
        Ok(vec![0.25; 8])
    }
}

/// Audio provider that always succeeds or always fails
pub struct StaticAudio {
    pub fail: bool,
    pub requests: std::sync::Mutex<Vec<AudioSummaryRequest>>,
}

impl StaticAudio {
    pub fn ok() -> Self {
        Self {
            fail: false,
            requests: Default::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            requests: Default::default(),
        }
    }
}

#[async_trait]
impl AudioSummaryProvider for StaticAudio {
    async fn audio_summary(
        &self,
        request: &AudioSummaryRequest,
    ) -> Result<Option<AudioData>, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(ProviderError::Status {
                provider: "static",
                status: 502,
                body: String::new(),
            });
        }
        Ok(Some(sample_audio_data()))
    }
}

/// Summarizer returning fixed text (empty means "nothing generated")
pub struct StaticSummarizer(pub Result<String, ()>);

#[async_trait]
impl TextSummarizer for StaticSummarizer {
    async fn summarize(&self, _title: &str, _description: &str) -> Result<String, ProviderError> {
        self.0
            .clone()
            .map_err(|_| ProviderError::invalid("static", "llm unavailable"))
    }
}

/// Synthesizer returning fixed bytes
pub struct StaticSpeech(pub &'static [u8]);

#[async_trait]
impl SpeechSynthesizer for StaticSpeech {
    async fn synthesize(&self, _text: &str) -> Result<Bytes, ProviderError> {
        Ok(Bytes::from_static(self.0))
    }
}

/// Uploader returning [`sample_audio_data`]
pub struct StaticUploader;

#[async_trait]
impl AudioUploader for StaticUploader {
    async fn upload(&self, _audio: Bytes, _file_name: &str) -> Result<AudioData, ProviderError> {
        Ok(sample_audio_data())
    }
}

// ============================================================================
// Wikipedia mock helpers
// ============================================================================

pub fn wiki_client(server: &MockServer) -> WikiClient {
    WikiClient::with_settings(
        &format!("{}{API_PATH}", server.uri()),
        "wikireel-tests/1.0",
        1000,
        Duration::from_secs(5),
    )
    .unwrap()
}

/// Crawl limits over a single topic, seeded
pub fn single_topic_config(subcategory: &str) -> CrawlConfig {
    CrawlConfig {
        seed: Some(7),
        max_attempts: 3,
        categories: vec![TopicCategory::new("Physics & Chemistry", &[subcategory])],
        ..Default::default()
    }
}

pub fn crawler(
    server: &MockServer,
    config: CrawlConfig,
    embedder: Arc<dyn Embedder>,
    audio: Arc<dyn AudioSummaryProvider>,
) -> WikiCrawler {
    WikiCrawler::new(wiki_client(server), embedder, audio, config, ARTICLE_BASE).unwrap()
}

pub async fn mount_category(server: &MockServer, subcategory: &str, members: &[(i64, &str)]) {
    let members: Vec<Value> = members
        .iter()
        .map(|(id, title)| json!({"pageid": id, "ns": 0, "title": title}))
        .collect();

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("list", "categorymembers"))
        .and(query_param("cmtitle", format!("Category:{subcategory}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "batchcomplete": true,
            "query": {"categorymembers": members}
        })))
        .mount(server)
        .await;
}

pub async fn mount_page(
    server: &MockServer,
    page_id: i64,
    title: &str,
    extract: &str,
    images: &[&str],
) {
    let images: Vec<Value> = images
        .iter()
        .map(|t| json!({"ns": 6, "title": t}))
        .collect();

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("prop", "extracts|images"))
        .and(query_param("titles", title))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "batchcomplete": true,
            "query": {"pages": [{
                "pageid": page_id,
                "ns": 0,
                "title": title,
                "extract": extract,
                "images": images
            }]}
        })))
        .mount(server)
        .await;
}

pub async fn mount_image(server: &MockServer, file_title: &str, url: &str) {
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("prop", "imageinfo"))
        .and(query_param("titles", file_title))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "batchcomplete": true,
            "query": {"pages": [{
                "ns": 6,
                "title": file_title,
                "imageinfo": [{"url": url}]
            }]}
        })))
        .mount(server)
        .await;
}

/// A page with one resolvable `.jpg`
pub async fn mount_good_page(server: &MockServer, page_id: i64, title: &str) {
    let file = format!("File:{}.jpg", title.replace(' ', "_"));
    mount_page(server, page_id, title, &format!("{title} is a test page."), &[&file]).await;
    mount_image(
        server,
        &file,
        &format!("https://upload.wikimedia.org/wikipedia/commons/{page_id}.jpg"),
    )
    .await;
}
