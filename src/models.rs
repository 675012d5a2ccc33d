// Core data structures for the wikireel pipeline

use serde::{Deserialize, Serialize};

use crate::utils::error::SkipReason;

/// Display fields of a harvested article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleData {
    pub article_image: String,
    pub article_summary: String, // truncated to 500 chars + "..."
    pub article_sub_tag: String,
    pub article_heading: String,
    pub article_link: String,
}

/// Metadata of an uploaded audio summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioData {
    pub file_url: String,
    pub file_public_id: Option<String>,
    pub file_format: Option<String>,
    pub duration: Option<f64>, // seconds
    pub file_size: Option<u64>, // bytes
    pub technical: Option<serde_json::Value>,
}

/// The persisted article record, keyed by `article_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub article_id: i64,
    pub article_data: ArticleData,
    pub article_embedding: Vec<f32>,
    pub audio_data: Option<AudioData>,
    pub tags: [String; 2], // [main category, subcategory]
}

impl Article {
    /// Main category tag
    pub fn main_category(&self) -> &str {
        &self.tags[0]
    }

    /// Subcategory tag
    pub fn subcategory(&self) -> &str {
        &self.tags[1]
    }

    /// Whether an audio summary was attached
    pub fn has_audio(&self) -> bool {
        self.audio_data.is_some()
    }
}

/// A topic and the Wikipedia categories sampled for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCategory {
    pub name: String,
    pub subcategories: Vec<String>,
}

impl TopicCategory {
    pub fn new(name: impl Into<String>, subcategories: &[&str]) -> Self {
        Self {
            name: name.into(),
            subcategories: subcategories.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The fixed topic catalog
    pub fn catalog() -> Vec<Self> {
        vec![
            Self::new("Artificial Intelligence", &["Artificial intelligence"]),
            Self::new("Space Exploration", &["Space exploration"]),
            Self::new("World Wars", &["World War II"]),
            Self::new("Hollywood & Cinema", &["Film"]),
            Self::new("Music History", &["Music"]),
            Self::new("Olympics & Global Sports", &["Olympic Games"]),
            Self::new("Physics & Chemistry", &["Physics"]),
            Self::new("Medical Innovations", &["Medicine"]),
            Self::new("Environmental Science", &["Environmental science"]),
            Self::new("Global Politics", &["Politics"]),
            Self::new("Stock Market & Economy", &["Economics"]),
            Self::new("Philosophy & Ethics", &["Philosophy"]),
            Self::new("Psychology & Neuroscience", &["Neuroscience"]),
            Self::new("Modern Literature", &["Literature"]),
        ]
    }
}

/// Per-run crawl counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    pub attempts: u32,
    pub empty_categories: u32,
    pub failed_requests: u32,
    pub candidates: u32,
    pub skipped_missing: u32,
    pub skipped_no_summary: u32,
    pub skipped_no_image: u32,
    pub skipped_no_embedding: u32,
    pub skipped_duplicate: u32,
    pub missing_audio: u32,
    pub collected: u32,
}

impl CrawlStats {
    /// Count a dropped candidate under its reason
    pub fn record_skip(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::MissingPage => self.skipped_missing += 1,
            SkipReason::NoSummary => self.skipped_no_summary += 1,
            SkipReason::NoImage => self.skipped_no_image += 1,
            SkipReason::NoEmbedding => self.skipped_no_embedding += 1,
            SkipReason::Duplicate => self.skipped_duplicate += 1,
        }
    }

    /// Share of candidates that made it into the output (0.0 - 1.0)
    pub fn acceptance_rate(&self) -> f64 {
        if self.candidates == 0 {
            return 1.0;
        }
        self.collected as f64 / self.candidates as f64
    }
}
