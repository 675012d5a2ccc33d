//! HTTP client for the Wikipedia Action API
//!
//! This module wraps the three `action=query` calls the crawler needs:
//! - category member listing (`list=categorymembers`)
//! - intro extract and linked images (`prop=extracts|images`)
//! - image URL resolution (`prop=imageinfo`)
//!
//! Requests share one client with a fixed User-Agent and timeout, and pass
//! through a governor rate limiter. Nothing is retried.

use crate::config::WikipediaConfig;
use crate::utils::error::FetchError;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;

/// Parameters sent with every query
const BASE_PARAMS: &[(&str, &str)] = &[
    ("action", "query"),
    ("format", "json"),
    ("formatversion", "2"),
];

/// One entry of a category listing
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CategoryMember {
    #[serde(default)]
    pub pageid: Option<i64>,
    pub title: String,
}

/// Extract and image titles of a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    pub page_id: i64,
    pub title: String,
    pub extract: Option<String>,
    pub image_titles: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    query: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CategoryMembersQuery {
    #[serde(default)]
    categorymembers: Vec<CategoryMember>,
}

#[derive(Debug, Deserialize)]
struct PagesQuery<P> {
    #[serde(default = "Vec::new")]
    pages: Vec<P>,
}

#[derive(Debug, Deserialize)]
struct ExtractPage {
    pageid: Option<i64>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    missing: bool,
    extract: Option<String>,
    #[serde(default)]
    images: Vec<ImageRef>,
}

#[derive(Debug, Deserialize)]
struct ImageRef {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ImageInfoPage {
    #[serde(default)]
    imageinfo: Vec<ImageInfo>,
}

#[derive(Debug, Deserialize)]
struct ImageInfo {
    url: Option<String>,
}

/// Wikipedia API client with rate limiting
pub struct WikiClient {
    /// HTTP client with configured timeout and user agent
    client: Client,

    /// Rate limiter to control request frequency
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    /// Action API endpoint
    api_url: String,
}

impl WikiClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: &WikipediaConfig) -> Result<Self, FetchError> {
        Self::with_settings(
            &config.api_url,
            &config.user_agent,
            config.requests_per_second,
            config.request_timeout(),
        )
    }

    /// Create a client against a custom endpoint, e.g. a mock server
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_settings(
        api_url: &str,
        user_agent: &str,
        requests_per_second: u32,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        if api_url.is_empty() {
            return Err(FetchError::InvalidUrl("empty API URL".to_string()));
        }

        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .build()?;

        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
            api_url: api_url.to_string(),
        })
    }

    /// Endpoint this client talks to
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// List page members of `Category:<subcategory>`
    ///
    /// An unknown or empty category yields an empty list, not an error.
    pub async fn category_members(
        &self,
        subcategory: &str,
        limit: u32,
    ) -> Result<Vec<CategoryMember>, FetchError> {
        let cmtitle = format!("Category:{subcategory}");
        let cmlimit = limit.to_string();
        let response: QueryResponse<CategoryMembersQuery> = self
            .query(&[
                ("list", "categorymembers"),
                ("cmtype", "page"),
                ("cmtitle", cmtitle.as_str()),
                ("cmlimit", cmlimit.as_str()),
            ])
            .await?;

        Ok(response
            .query
            .map(|q| q.categorymembers)
            .unwrap_or_default())
    }

    /// Fetch the plain-text intro extract and image titles of a page
    ///
    /// Returns `None` when the page is missing or has no page id.
    pub async fn page_summary(&self, title: &str) -> Result<Option<PageSummary>, FetchError> {
        let response: QueryResponse<PagesQuery<ExtractPage>> = self
            .query(&[
                ("prop", "extracts|images"),
                ("exintro", "1"),
                ("exlimit", "1"),
                ("explaintext", "1"),
                ("titles", title),
            ])
            .await?;

        let Some(page) = response.query.and_then(|q| q.pages.into_iter().next()) else {
            return Ok(None);
        };

        if page.missing {
            return Ok(None);
        }

        let Some(page_id) = page.pageid else {
            return Ok(None);
        };

        Ok(Some(PageSummary {
            page_id,
            title: if page.title.is_empty() {
                title.to_string()
            } else {
                page.title
            },
            extract: page.extract,
            image_titles: page.images.into_iter().map(|i| i.title).collect(),
        }))
    }

    /// Resolve a `File:` title to its hosted URL
    pub async fn image_url(&self, file_title: &str) -> Result<Option<String>, FetchError> {
        let response: QueryResponse<PagesQuery<ImageInfoPage>> = self
            .query(&[
                ("prop", "imageinfo"),
                ("iiprop", "url"),
                ("titles", file_title),
            ])
            .await?;

        Ok(response
            .query
            .and_then(|q| q.pages.into_iter().next())
            .and_then(|page| page.imageinfo.into_iter().next())
            .and_then(|info| info.url)
            .filter(|url| !url.is_empty()))
    }

    /// Send one `action=query` request and decode the JSON body
    async fn query<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T, FetchError> {
        self.rate_limiter.until_ready().await;

        tracing::trace!(api = %self.api_url, ?params, "Wikipedia query");

        let response = self
            .client
            .get(&self.api_url)
            .query(BASE_PARAMS)
            .query(params)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::ServerError(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(FetchError::from_reqwest)?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))
    }
}
