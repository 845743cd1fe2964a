use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

/// Failure of an external capability.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    #[error("upstream returned no output")]
    EmptyOutput,

    #[error("could not extract text: {0}")]
    Extraction(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Transport(err.to_string())
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Read a non-success response into a `Status` error.
pub(crate) async fn status_error(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    ProviderError::Status { status, body }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens,
            temperature,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompletionUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub usage: Option<CompletionUsage>,
}

/// An uploaded image forwarded to an editing capability
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Name used in logs and failure messages
    fn name(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> ProviderResult<Completion>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Render `prompt` and return the URI of the hosted image.
    async fn generate(&self, prompt: &str) -> ProviderResult<String>;
}

#[async_trait]
pub trait ImageEditor: Send + Sync {
    fn name(&self) -> &str;

    async fn remove_background(&self, image: ImageUpload) -> ProviderResult<String>;

    async fn remove_object(&self, image: ImageUpload, object: &str) -> ProviderResult<String>;
}

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    fn name(&self) -> &str;

    async fn extract_text(&self, document: Bytes) -> ProviderResult<String>;
}
