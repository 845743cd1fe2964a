//! Test helpers: build the router over in-memory stores and stub capabilities.
//!
//! Run from workspace root: `cargo test -p inkwell-api`. No database or
//! network access is needed.

#![allow(dead_code)]

pub mod auth;
pub mod fixtures;

use axum_test::TestServer;
use inkwell_api::auth::SessionVerifier;
use inkwell_api::setup::routes::app_router;
use inkwell_api::state::AppState;
use inkwell_api::{Capabilities, GenerationGateway, GenerationLimits};
use inkwell_db::{InMemoryCreationStore, InMemoryUsageLedger};
use inkwell_providers::test_helpers::{
    StubDocumentExtractor, StubImageEditor, StubImageGenerator, StubTextGenerator,
};
use std::sync::Arc;
use std::time::Duration;

pub const GENERATED_TEXT: &str = "Oceans cover seventy percent of the planet.";
pub const GENERATED_IMAGE_URL: &str = "https://cdn.test/generated.png";
pub const MEDIA_BASE_URL: &str = "https://cdn.test";
pub const RESUME_TEXT: &str = "Jane Doe. Senior engineer, ten years of Rust.";
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Test application: server plus handles on every collaborator.
pub struct TestApp {
    pub server: TestServer,
    pub gateway: Arc<GenerationGateway>,
    pub ledger: Arc<InMemoryUsageLedger>,
    pub creations: Arc<InMemoryCreationStore>,
    pub text: Arc<StubTextGenerator>,
    pub images: Arc<StubImageGenerator>,
    pub editor: Arc<StubImageEditor>,
    pub documents: Arc<StubDocumentExtractor>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Total calls made to any external capability.
    pub fn external_calls(&self) -> usize {
        self.text.calls() + self.images.calls() + self.editor.calls() + self.documents.calls()
    }
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with_timeout(Duration::from_secs(5))
}

pub fn setup_test_app_with_timeout(timeout: Duration) -> TestApp {
    let ledger = Arc::new(InMemoryUsageLedger::new());
    let creations = Arc::new(InMemoryCreationStore::new());
    let text = Arc::new(StubTextGenerator::new(GENERATED_TEXT));
    let images = Arc::new(StubImageGenerator::new(GENERATED_IMAGE_URL));
    let editor = Arc::new(StubImageEditor::new(MEDIA_BASE_URL));
    let documents = Arc::new(StubDocumentExtractor::new(RESUME_TEXT));

    let gateway = Arc::new(GenerationGateway::new(
        Capabilities {
            text: text.clone(),
            images: images.clone(),
            editor: editor.clone(),
            documents: documents.clone(),
        },
        ledger.clone(),
        creations.clone(),
        GenerationLimits {
            max_article_tokens: 4096,
            external_call_timeout: timeout,
        },
    ));

    let state = Arc::new(AppState::new(gateway.clone(), creations.clone()));
    let verifier = Arc::new(SessionVerifier::shared_secret(
        auth::TEST_SESSION_SECRET,
        None,
    ));
    let app = app_router(state, verifier, MAX_BODY_BYTES);
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        gateway,
        ledger,
        creations,
        text,
        images,
        editor,
        documents,
    }
}
