//! ClipDrop text-to-image, hosted through Cloudinary

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Duration;

use crate::cloudinary::CloudinaryClient;
use crate::traits::{status_error, ImageGenerator, ProviderError, ProviderResult};

const API_BASE: &str = "https://clipdrop-api.co";

pub struct ClipDropClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl Debug for ClipDropClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ClipDropClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ClipDropClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for ClipDrop")?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Render `prompt` to PNG bytes.
    #[tracing::instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub async fn text_to_image(&self, prompt: &str) -> ProviderResult<Bytes> {
        let form = reqwest::multipart::Form::new().text("prompt", prompt.to_string());

        let response = self
            .http_client
            .post(format!("{}/text-to-image/v1", self.base_url))
            .header("x-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let image = response.bytes().await?;
        if image.is_empty() {
            return Err(ProviderError::EmptyOutput);
        }
        Ok(image)
    }
}

/// Generates with ClipDrop and returns the Cloudinary URL of the upload.
pub struct ClipDropImageGenerator {
    clipdrop: ClipDropClient,
    host: Arc<CloudinaryClient>,
}

impl ClipDropImageGenerator {
    pub fn new(clipdrop: ClipDropClient, host: Arc<CloudinaryClient>) -> Self {
        Self { clipdrop, host }
    }
}

#[async_trait]
impl ImageGenerator for ClipDropImageGenerator {
    fn name(&self) -> &str {
        "image generator"
    }

    async fn generate(&self, prompt: &str) -> ProviderResult<String> {
        let image = self.clipdrop.text_to_image(prompt).await?;
        let asset = self
            .host
            .upload(image, "generated.png", "image/png", None)
            .await?;
        Ok(asset.secure_url)
    }
}
