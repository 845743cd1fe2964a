//! Stub capabilities for exercising the gateway without network access
//!
//! Every stub records the calls it receives and can be switched to fail or to
//! stall for a fixed delay.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::traits::{
    Completion, CompletionRequest, DocumentExtractor, ImageEditor, ImageGenerator, ImageUpload,
    ProviderError, ProviderResult, TextGenerator,
};

#[derive(Default)]
struct Behaviour {
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
}

impl Behaviour {
    async fn enter(&self) -> ProviderResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delay.lock().ok().and_then(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProviderError::Status {
                status: 503,
                body: "stub failure".to_string(),
            });
        }
        Ok(())
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn set_delay(&self, delay: Option<Duration>) {
        if let Ok(mut current) = self.delay.lock() {
            *current = delay;
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Echoes a fixed reply and keeps every request it was given.
pub struct StubTextGenerator {
    reply: String,
    requests: Mutex<Vec<CompletionRequest>>,
    behaviour: Behaviour,
}

impl StubTextGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            requests: Mutex::new(Vec::new()),
            behaviour: Behaviour::default(),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.behaviour.set_failing(failing);
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        self.behaviour.set_delay(delay);
    }

    pub fn calls(&self) -> usize {
        self.behaviour.calls()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests().pop()
    }
}

#[async_trait]
impl TextGenerator for StubTextGenerator {
    fn name(&self) -> &str {
        "language model"
    }

    async fn complete(&self, request: CompletionRequest) -> ProviderResult<Completion> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        self.behaviour.enter().await?;
        Ok(Completion {
            text: self.reply.clone(),
            usage: None,
        })
    }
}

pub struct StubImageGenerator {
    uri: String,
    behaviour: Behaviour,
}

impl StubImageGenerator {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            behaviour: Behaviour::default(),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.behaviour.set_failing(failing);
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        self.behaviour.set_delay(delay);
    }

    pub fn calls(&self) -> usize {
        self.behaviour.calls()
    }
}

#[async_trait]
impl ImageGenerator for StubImageGenerator {
    fn name(&self) -> &str {
        "image generator"
    }

    async fn generate(&self, _prompt: &str) -> ProviderResult<String> {
        self.behaviour.enter().await?;
        Ok(self.uri.clone())
    }
}

/// Returns `{base}/no-bg/{filename}` and `{base}/no-{object}/{filename}`.
pub struct StubImageEditor {
    base_uri: String,
    objects: Mutex<Vec<String>>,
    behaviour: Behaviour,
}

impl StubImageEditor {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            objects: Mutex::new(Vec::new()),
            behaviour: Behaviour::default(),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.behaviour.set_failing(failing);
    }

    pub fn calls(&self) -> usize {
        self.behaviour.calls()
    }

    pub fn removed_objects(&self) -> Vec<String> {
        self.objects.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ImageEditor for StubImageEditor {
    fn name(&self) -> &str {
        "media host"
    }

    async fn remove_background(&self, image: ImageUpload) -> ProviderResult<String> {
        self.behaviour.enter().await?;
        Ok(format!("{}/no-bg/{}", self.base_uri, image.filename))
    }

    async fn remove_object(&self, image: ImageUpload, object: &str) -> ProviderResult<String> {
        if let Ok(mut objects) = self.objects.lock() {
            objects.push(object.to_string());
        }
        self.behaviour.enter().await?;
        Ok(format!("{}/no-{}/{}", self.base_uri, object, image.filename))
    }
}

/// Returns a fixed text for any document.
pub struct StubDocumentExtractor {
    text: String,
    behaviour: Behaviour,
}

impl StubDocumentExtractor {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            behaviour: Behaviour::default(),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.behaviour.set_failing(failing);
    }

    pub fn calls(&self) -> usize {
        self.behaviour.calls()
    }
}

#[async_trait]
impl DocumentExtractor for StubDocumentExtractor {
    fn name(&self) -> &str {
        "document extractor"
    }

    async fn extract_text(&self, _document: Bytes) -> ProviderResult<String> {
        self.behaviour.enter().await?;
        Ok(self.text.clone())
    }
}
