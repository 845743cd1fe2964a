//! Cloudinary media hosting
//!
//! Uploads are signed with SHA-256 over the sorted upload parameters followed
//! by the API secret. The account must have SHA-256 signatures enabled.

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::traits::{status_error, ImageEditor, ImageUpload, ProviderError, ProviderResult};

const API_BASE: &str = "https://api.cloudinary.com/v1_1";
const DELIVERY_BASE: &str = "https://res.cloudinary.com";
const BACKGROUND_REMOVAL: &str = "e_background_removal";

/// Characters kept verbatim inside a transformation component
const TRANSFORMATION_SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub public_id: String,
    pub secure_url: String,
}

pub struct CloudinaryClient {
    http_client: reqwest::Client,
    config: CloudinaryConfig,
    api_base: String,
    delivery_base: String,
}

impl Debug for CloudinaryClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CloudinaryClient")
            .field("config", &self.config)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for Cloudinary")?;

        Ok(Self {
            http_client,
            config,
            api_base: API_BASE.to_string(),
            delivery_base: DELIVERY_BASE.to_string(),
        })
    }

    /// Point uploads and delivery URLs at another host.
    pub fn with_base_urls(mut self, api_base: impl Into<String>, delivery_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self.delivery_base = delivery_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Upload an image, optionally applying an incoming transformation.
    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    pub async fn upload(
        &self,
        data: Bytes,
        filename: &str,
        content_type: &str,
        transformation: Option<&str>,
    ) -> ProviderResult<UploadedAsset> {
        let timestamp = chrono::Utc::now().timestamp().to_string();

        let mut params = BTreeMap::new();
        params.insert("timestamp", timestamp);
        if let Some(transformation) = transformation {
            params.insert("transformation", transformation.to_string());
        }
        let signature = sign(&params, &self.config.api_secret);

        let file = reqwest::multipart::Part::bytes(data.to_vec())
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value);
        }

        let response = self
            .http_client
            .post(format!(
                "{}/{}/image/upload",
                self.api_base, self.config.cloud_name
            ))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        tracing::debug!(public_id = %parsed.public_id, "Uploaded image to Cloudinary");

        Ok(UploadedAsset {
            public_id: parsed.public_id,
            secure_url: parsed.secure_url,
        })
    }

    /// Delivery URL for `public_id` with a transformation applied on the fly.
    pub fn transformed_url(&self, public_id: &str, transformation: &str) -> String {
        format!(
            "{}/{}/image/upload/{}/{}",
            self.delivery_base, self.config.cloud_name, transformation, public_id
        )
    }
}

/// SHA-256 hex signature of `k=v` pairs joined with `&`, sorted by key, with
/// the secret appended.
fn sign(params: &BTreeMap<&str, String>, secret: &str) -> String {
    let to_sign = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");
    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn gen_remove_transformation(object: &str) -> String {
    format!(
        "e_gen_remove:{}",
        utf8_percent_encode(object.trim(), TRANSFORMATION_SAFE)
    )
}

#[async_trait]
impl ImageEditor for CloudinaryClient {
    fn name(&self) -> &str {
        "media host"
    }

    async fn remove_background(&self, image: ImageUpload) -> ProviderResult<String> {
        let asset = self
            .upload(
                image.data,
                &image.filename,
                &image.content_type,
                Some(BACKGROUND_REMOVAL),
            )
            .await?;
        Ok(asset.secure_url)
    }

    async fn remove_object(&self, image: ImageUpload, object: &str) -> ProviderResult<String> {
        let asset = self
            .upload(image.data, &image.filename, &image.content_type, None)
            .await?;
        Ok(self.transformed_url(&asset.public_id, &gen_remove_transformation(object)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client(server: &mockito::Server) -> CloudinaryClient {
        CloudinaryClient::new(
            CloudinaryConfig {
                cloud_name: "demo".to_string(),
                api_key: "key".to_string(),
                api_secret: "secret".to_string(),
            },
            Duration::from_secs(5),
        )
        .unwrap()
        .with_base_urls(server.url(), "https://cdn.test")
    }

    fn upload() -> ImageUpload {
        ImageUpload {
            filename: "photo.png".to_string(),
            content_type: "image/png".to_string(),
            data: Bytes::from_static(b"fake png bytes"),
        }
    }

    #[test]
    fn test_signature_is_sorted_and_salted() {
        let mut params = BTreeMap::new();
        params.insert("transformation", "e_background_removal".to_string());
        params.insert("timestamp", "1700000000".to_string());

        let mut hasher = Sha256::new();
        hasher.update(b"timestamp=1700000000&transformation=e_background_removalsecret");
        let expected = hex::encode(hasher.finalize());

        assert_eq!(sign(&params, "secret"), expected);
    }

    #[test]
    fn test_object_is_encoded_into_transformation() {
        assert_eq!(gen_remove_transformation("cup"), "e_gen_remove:cup");
        assert_eq!(gen_remove_transformation(" cup/ "), "e_gen_remove:cup%2F");
    }

    #[tokio::test]
    async fn test_remove_background_requests_transformation() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/demo/image/upload")
            .match_body(Matcher::Regex("e_background_removal".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"public_id": "abc", "secure_url": "https://cdn.test/demo/abc.png"})
                    .to_string(),
            )
            .create_async()
            .await;

        let uri = client(&server).remove_background(upload()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(uri, "https://cdn.test/demo/abc.png");
    }

    #[tokio::test]
    async fn test_remove_object_returns_delivery_url() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/demo/image/upload")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"public_id": "folder/abc", "secure_url": "https://cdn.test/x.png"})
                    .to_string(),
            )
            .create_async()
            .await;

        let uri = client(&server)
            .remove_object(upload(), "cup")
            .await
            .unwrap();

        assert_eq!(
            uri,
            "https://cdn.test/demo/image/upload/e_gen_remove:cup/folder/abc"
        );
    }

    #[tokio::test]
    async fn test_rejected_upload_is_status_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/demo/image/upload")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Invalid Signature"}}"#)
            .create_async()
            .await;

        let err = client(&server).remove_background(upload()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 401, .. }));
    }
}
