//! Text-to-speech synthesis
//!
//! Speech is produced by Amazon Polly's `SynthesizeSpeech` REST call,
//! signed with SigV4. The response body is the raw audio stream.

pub mod sigv4;

use async_trait::async_trait;
use bytes::Bytes;
use rand::seq::SliceRandom;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use url::Url;

use crate::config::SpeechConfig;
use crate::utils::error::ProviderError;

const PROVIDER: &str = "polly";
const CONTENT_TYPE: &str = "application/json";

/// US English voices used when random voice selection is enabled
pub const VOICE_POOL: [&str; 10] = [
    "Joanna", "Salli", "Kimberly", "Kendra", "Ivy", "Gregory", "Kevin", "Matthew", "Justin",
    "Joey",
];

/// Anything that can turn text into audio bytes
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text`, returning the encoded audio stream
    async fn synthesize(&self, text: &str) -> Result<Bytes, ProviderError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SynthesizeSpeechRequest<'a> {
    engine: &'a str,
    language_code: &'a str,
    output_format: &'a str,
    sample_rate: &'a str,
    text: &'a str,
    text_type: &'a str,
    voice_id: &'a str,
}

/// Polly client
pub struct PollySynthesizer {
    client: Client,
    config: SpeechConfig,
    url: Url,
    access_key_id: String,
    secret_access_key: String,
}

impl PollySynthesizer {
    /// Create a new synthesizer
    ///
    /// # Errors
    ///
    /// Fails when credentials are missing or the endpoint is not a valid URL
    pub fn new(config: &SpeechConfig) -> Result<Self, ProviderError> {
        let access_key_id = config
            .access_key_id
            .clone()
            .ok_or_else(|| ProviderError::missing(PROVIDER, "AWS_ACCESS_KEY"))?;
        let secret_access_key = config
            .secret_access_key
            .clone()
            .ok_or_else(|| ProviderError::missing(PROVIDER, "AWS_SECRET_KEY"))?;

        let endpoint = config.endpoint_url();
        let url = Url::parse(&format!("{}/v1/speech", endpoint.trim_end_matches('/')))
            .map_err(|e| ProviderError::invalid(PROVIDER, format!("bad endpoint {endpoint}: {e}")))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::http(PROVIDER, e))?;

        Ok(Self {
            client,
            config: config.clone(),
            url,
            access_key_id,
            secret_access_key,
        })
    }

    /// Voice for the next request
    fn pick_voice(&self) -> &str {
        if self.config.random_voice {
            VOICE_POOL
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or(self.config.voice_id.as_str())
        } else {
            &self.config.voice_id
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for PollySynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Bytes, ProviderError> {
        let voice_id = self.pick_voice();
        let request = SynthesizeSpeechRequest {
            engine: &self.config.engine,
            language_code: &self.config.language_code,
            output_format: &self.config.output_format,
            sample_rate: &self.config.sample_rate,
            text,
            text_type: "text",
            voice_id,
        };
        let body = serde_json::to_vec(&request)
            .map_err(|e| ProviderError::invalid(PROVIDER, e.to_string()))?;

        let params = sigv4::SigningParams {
            access_key_id: &self.access_key_id,
            secret_access_key: &self.secret_access_key,
            region: &self.config.region,
            service: PROVIDER,
        };
        let signed = sigv4::sign(
            &params,
            "POST",
            &self.url,
            CONTENT_TYPE,
            &body,
            chrono::Utc::now(),
        )
        .map_err(|e| ProviderError::invalid(PROVIDER, format!("signing failed: {e}")))?;

        tracing::debug!(voice_id, chars = text.chars().count(), "Synthesizing speech");

        let response = self
            .client
            .post(self.url.clone())
            .header("Content-Type", CONTENT_TYPE)
            .header("X-Amz-Date", &signed.amz_date)
            .header("Authorization", &signed.authorization)
            .body(body)
            .send()
            .await
            .map_err(|e| ProviderError::http(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(PROVIDER, response).await);
        }

        response
            .bytes()
            .await
            .map_err(|e| ProviderError::http(PROVIDER, e))
    }
}
