//! Audio upload to object storage
//!
//! Generated speech is uploaded to Cloudinary with an unsigned upload
//! preset; the returned metadata becomes the article's `audio_data`.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::MediaConfig;
use crate::models::AudioData;
use crate::utils::error::ProviderError;

const PROVIDER: &str = "cloudinary";

/// Anything that can store an audio file and describe it
#[async_trait]
pub trait AudioUploader: Send + Sync {
    /// Upload `audio` under `file_name`
    async fn upload(&self, audio: Bytes, file_name: &str) -> Result<AudioData, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    public_id: Option<String>,
    format: Option<String>,
    duration: Option<f64>,
    bytes: Option<u64>,
    audio: Option<serde_json::Value>,
}

impl UploadResponse {
    fn into_audio_data(self) -> Result<AudioData, ProviderError> {
        let file_url = self
            .secure_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ProviderError::invalid(PROVIDER, "response has no secure_url"))?;

        Ok(AudioData {
            file_url,
            file_public_id: self.public_id,
            file_format: self.format,
            duration: self.duration,
            file_size: self.bytes,
            technical: self.audio,
        })
    }
}

/// Cloudinary unsigned uploader
pub struct CloudinaryUploader {
    client: Client,
    upload_url: String,
    config: MediaConfig,
}

impl CloudinaryUploader {
    /// Create a new uploader
    ///
    /// # Errors
    ///
    /// Fails when the cloud name is not configured
    pub fn new(config: &MediaConfig) -> Result<Self, ProviderError> {
        let cloud_name = config
            .cloud_name
            .as_deref()
            .ok_or_else(|| ProviderError::missing(PROVIDER, "CLOUDINARY_CLOUD_NAME"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::http(PROVIDER, e))?;

        Ok(Self {
            client,
            upload_url: format!(
                "{}/v1_1/{}/auto/upload",
                config.api_base.trim_end_matches('/'),
                cloud_name
            ),
            config: config.clone(),
        })
    }

    /// Upload endpoint
    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }
}

#[async_trait]
impl AudioUploader for CloudinaryUploader {
    async fn upload(&self, audio: Bytes, file_name: &str) -> Result<AudioData, ProviderError> {
        let size = audio.len();
        let file = Part::stream_with_length(audio, size as u64).file_name(file_name.to_string());

        let mut form = Form::new()
            .part("file", file)
            .text("upload_preset", self.config.upload_preset.clone())
            .text("resource_type", self.config.resource_type.clone());
        if let Some(folder) = &self.config.folder {
            form = form.text("folder", folder.clone());
        }

        tracing::debug!(file_name, size, "Uploading audio");

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::http(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(PROVIDER, response).await);
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::invalid(PROVIDER, e.to_string()))?;

        let audio = body.into_audio_data()?;
        tracing::info!(file_url = %audio.file_url, "Audio uploaded");
        Ok(audio)
    }
}
