//! Generation gateway
//!
//! One pipeline serves every creation kind:
//! validate, resolve identity, check plan and quota (reserving a free-tier
//! slot when metered), invoke the capability under a timeout, record the
//! creation, then commit the reserved slot.
//!
//! A reserved slot is released on every failure path, so `free_usage` only
//! grows after a creation has been recorded. Once a slot is held the rest of
//! the pipeline runs on its own task: a caller that disconnects does not
//! cancel a billable call half way.

pub mod prompts;
mod reservation;
pub mod request;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use inkwell_core::constants::{FREE_USAGE_LIMIT, RESERVATION_LEASE_MARGIN_SECS};
use inkwell_core::models::{CreationKind, CreationRecord, Identity, NewCreation};
use inkwell_core::{check_quota, AppError, Config, PlanGate, QuotaDecision};
use inkwell_db::{CreationStore, UsageLedger};
use inkwell_providers::{
    DocumentExtractor, ImageEditor, ImageGenerator, ProviderError, TextGenerator,
};

use crate::auth::AuthContext;
use reservation::ReservationGuard;
use tracing::Instrument;

pub use request::{
    ArticleRequest, BlogTitleRequest, EmailRequest, GenerationInput, GenerationRequest,
    GenerationTask, ImageRequest, SocialCaptionRequest, SummaryRequest, TranslationRequest,
};

/// External capabilities, constructed once at startup.
#[derive(Clone)]
pub struct Capabilities {
    pub text: Arc<dyn TextGenerator>,
    pub images: Arc<dyn ImageGenerator>,
    pub editor: Arc<dyn ImageEditor>,
    pub documents: Arc<dyn DocumentExtractor>,
}

#[derive(Debug, Clone, Copy)]
pub struct GenerationLimits {
    pub max_article_tokens: u32,
    pub external_call_timeout: Duration,
}

impl GenerationLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_article_tokens: config.max_article_tokens(),
            external_call_timeout: config.external_call_timeout(),
        }
    }

    /// How long a free-tier slot stays held without being settled. Covers
    /// the two capability calls of a resume review plus a margin.
    pub fn reservation_lease(&self) -> Duration {
        self.external_call_timeout * 2 + Duration::from_secs(RESERVATION_LEASE_MARGIN_SECS)
    }
}

/// Result of a successful generation
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub record: CreationRecord,
    /// Committed free-tier usage after this generation; `None` when the
    /// caller is not metered or the commit could not be confirmed.
    pub free_usage: Option<i32>,
}

#[derive(Clone)]
pub struct GenerationGateway {
    capabilities: Capabilities,
    ledger: Arc<dyn UsageLedger>,
    creations: Arc<dyn CreationStore>,
    limits: GenerationLimits,
}

impl GenerationGateway {
    pub fn new(
        capabilities: Capabilities,
        ledger: Arc<dyn UsageLedger>,
        creations: Arc<dyn CreationStore>,
        limits: GenerationLimits,
    ) -> Self {
        Self {
            capabilities,
            ledger,
            creations,
            limits,
        }
    }

    pub fn limits(&self) -> &GenerationLimits {
        &self.limits
    }

    /// Run one generation end to end.
    #[tracing::instrument(skip(self, auth, request), fields(user_id = %auth.user_id, plan = %auth.plan, kind = %request.kind()))]
    pub async fn generate(
        &self,
        auth: &AuthContext,
        request: GenerationRequest,
    ) -> Result<GenerationOutcome, AppError> {
        let input = request.validate(&self.limits)?;

        let identity = self.resolve(auth).await?;
        let reservation = self.authorize(&identity, input.kind).await?;

        let gateway = self.clone();
        tokio::spawn(
            async move { gateway.fulfil(identity, input, reservation).await }.in_current_span(),
        )
        .await
        .map_err(|e| AppError::Internal(format!("Generation task failed: {}", e)))?
    }

    /// Invoke, record and settle the reserved slot.
    async fn fulfil(
        &self,
        identity: Identity,
        input: GenerationInput,
        reservation: Option<ReservationGuard>,
    ) -> Result<GenerationOutcome, AppError> {
        let kind = input.kind;

        let content = match self.invoke(input.task).await {
            Ok(content) => content,
            Err(e) => {
                if let Some(reservation) = reservation {
                    reservation.release().await;
                }
                return Err(e);
            }
        };

        let creation = NewCreation::new(&identity.user_id, kind, input.recorded_prompt, content)
            .published(input.publish);
        let record = match self.record(creation).await {
            Ok(record) => record,
            Err(e) => {
                if let Some(reservation) = reservation {
                    reservation.release().await;
                }
                return Err(AppError::CreationNotRecorded {
                    kind: kind.to_string(),
                    source: Box::new(e),
                });
            }
        };

        let free_usage = match reservation {
            Some(reservation) => record_usage(reservation).await,
            None => None,
        };

        tracing::info!(creation_id = %record.id, "Generation completed");

        Ok(GenerationOutcome { record, free_usage })
    }

    /// Build the identity for this request: user and plan from the verified
    /// session, committed usage from the ledger.
    pub async fn resolve(&self, auth: &AuthContext) -> Result<Identity, AppError> {
        let free_usage = if auth.plan.is_premium() {
            0
        } else {
            self.ledger.free_usage(&auth.user_id).await?
        };
        Ok(Identity::new(auth.user_id.clone(), auth.plan, free_usage))
    }

    /// Apply the plan gate and, for metered callers, reserve a free-tier
    /// slot.
    async fn authorize(
        &self,
        identity: &Identity,
        kind: CreationKind,
    ) -> Result<Option<ReservationGuard>, AppError> {
        let gate = kind.plan_gate();
        if let QuotaDecision::Deny(reason) = check_quota(identity, gate.requires_premium()) {
            tracing::debug!(?reason, "Generation denied");
            return Err(reason.into_error(kind.feature_name()));
        }

        let metered = !identity.plan.is_premium() && gate == PlanGate::FreeWithQuota;
        if !metered {
            return Ok(None);
        }

        // Concurrent requests may hold the remaining slots even though the
        // committed count is below the limit.
        let reservation = self
            .ledger
            .try_reserve(
                &identity.user_id,
                FREE_USAGE_LIMIT,
                self.limits.reservation_lease(),
            )
            .await?;
        match reservation {
            Some(reservation) => Ok(Some(ReservationGuard::new(
                self.ledger.clone(),
                reservation,
            ))),
            None => {
                tracing::debug!(free_usage = identity.free_usage, "No free-tier slot left to reserve");
                Err(AppError::UsageLimitExceeded {
                    used: identity.free_usage,
                    limit: FREE_USAGE_LIMIT,
                })
            }
        }
    }

    async fn invoke(&self, task: GenerationTask) -> Result<String, AppError> {
        let caps = &self.capabilities;
        match task {
            GenerationTask::Complete(request) => {
                let completion = self
                    .call(caps.text.name(), caps.text.complete(request))
                    .await?;
                Ok(completion.text)
            }
            GenerationTask::SynthesizeImage { prompt } => {
                self.call(caps.images.name(), caps.images.generate(&prompt))
                    .await
            }
            GenerationTask::RemoveBackground(image) => {
                self.call(caps.editor.name(), caps.editor.remove_background(image))
                    .await
            }
            GenerationTask::RemoveObject { image, object } => {
                self.call(caps.editor.name(), caps.editor.remove_object(image, &object))
                    .await
            }
            GenerationTask::ReviewResume { document } => {
                let text = self
                    .call(caps.documents.name(), caps.documents.extract_text(document))
                    .await?;
                let completion = self
                    .call(
                        caps.text.name(),
                        caps.text.complete(request::resume_review_completion(&text)),
                    )
                    .await?;
                Ok(completion.text)
            }
        }
    }

    /// Await a capability call under the configured timeout.
    async fn call<T>(
        &self,
        service: &str,
        fut: impl Future<Output = Result<T, ProviderError>>,
    ) -> Result<T, AppError> {
        let timeout = self.limits.external_call_timeout;
        match tokio::time::timeout(timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::warn!(service = service, error = %e, "External capability failed");
                Err(AppError::ExternalService {
                    service: service.to_string(),
                    message: e.to_string(),
                })
            }
            Err(_) => {
                tracing::warn!(
                    service = service,
                    timeout_secs = timeout.as_secs(),
                    "External capability timed out"
                );
                Err(AppError::ExternalServiceTimeout {
                    service: service.to_string(),
                    seconds: timeout.as_secs(),
                })
            }
        }
    }

    /// Persist the creation. Called only after the capability succeeded.
    pub async fn record(&self, creation: NewCreation) -> Result<CreationRecord, AppError> {
        self.creations.insert(creation).await
    }
}

/// Count one free-tier generation. A commit failure is logged and swallowed:
/// the creation already exists and the caller has been served.
async fn record_usage(reservation: ReservationGuard) -> Option<i32> {
    match reservation.commit().await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::error!(
                error = %e,
                "Failed to commit free-tier usage; the slot is held until its lease expires"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell_core::models::Plan;
    use inkwell_db::{InMemoryCreationStore, InMemoryUsageLedger};
    use inkwell_providers::test_helpers::{
        StubDocumentExtractor, StubImageEditor, StubImageGenerator, StubTextGenerator,
    };

    struct Fixture {
        gateway: GenerationGateway,
        text: Arc<StubTextGenerator>,
        documents: Arc<StubDocumentExtractor>,
        ledger: Arc<InMemoryUsageLedger>,
        creations: Arc<InMemoryCreationStore>,
    }

    fn fixture(timeout: Duration) -> Fixture {
        let text = Arc::new(StubTextGenerator::new("generated text"));
        let documents = Arc::new(StubDocumentExtractor::new("Jane Doe, engineer"));
        let ledger = Arc::new(InMemoryUsageLedger::new());
        let creations = Arc::new(InMemoryCreationStore::new());
        let gateway = GenerationGateway::new(
            Capabilities {
                text: text.clone(),
                images: Arc::new(StubImageGenerator::new("https://cdn.test/image.png")),
                editor: Arc::new(StubImageEditor::new("https://cdn.test")),
                documents: documents.clone(),
            },
            ledger.clone(),
            creations.clone(),
            GenerationLimits {
                max_article_tokens: 4096,
                external_call_timeout: timeout,
            },
        );
        Fixture {
            gateway,
            text,
            documents,
            ledger,
            creations,
        }
    }

    fn free_user() -> AuthContext {
        AuthContext {
            user_id: "user_free".to_string(),
            plan: Plan::Free,
        }
    }

    fn article() -> GenerationRequest {
        GenerationRequest::Article(ArticleRequest {
            prompt: Some("Write about oceans".to_string()),
            length: Some(200),
        })
    }

    #[tokio::test]
    async fn test_free_article_commits_usage() {
        let f = fixture(Duration::from_secs(5));
        f.ledger.set_free_usage("user_free", 3);

        let outcome = f.gateway.generate(&free_user(), article()).await.unwrap();

        assert_eq!(outcome.free_usage, Some(4));
        assert_eq!(outcome.record.kind, CreationKind::Article);
        assert_eq!(outcome.record.content, "generated text");
        assert_eq!(f.ledger.reserved_of("user_free"), 0);
        assert_eq!(f.creations.len(), 1);
    }

    #[tokio::test]
    async fn test_capability_failure_releases_reservation() {
        let f = fixture(Duration::from_secs(5));
        f.ledger.set_free_usage("user_free", 3);
        f.text.set_failing(true);

        let err = f.gateway.generate(&free_user(), article()).await.unwrap_err();

        assert!(matches!(err, AppError::ExternalService { .. }));
        assert_eq!(f.ledger.free_usage_of("user_free"), 3);
        assert_eq!(f.ledger.reserved_of("user_free"), 0);
        assert!(f.creations.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_is_external_failure() {
        let f = fixture(Duration::from_millis(20));
        f.text.set_delay(Some(Duration::from_millis(500)));

        let err = f.gateway.generate(&free_user(), article()).await.unwrap_err();

        assert!(matches!(err, AppError::ExternalServiceTimeout { .. }));
        assert_eq!(f.ledger.reserved_of("user_free"), 0);
        assert!(f.creations.is_empty());
    }

    #[tokio::test]
    async fn test_unrecorded_creation_is_partial_failure() {
        let f = fixture(Duration::from_secs(5));
        f.creations.fail_inserts(true);

        let err = f.gateway.generate(&free_user(), article()).await.unwrap_err();

        assert!(matches!(err, AppError::CreationNotRecorded { .. }));
        assert_eq!(f.ledger.free_usage_of("user_free"), 0);
        assert_eq!(f.ledger.reserved_of("user_free"), 0);
    }

    #[tokio::test]
    async fn test_validation_precedes_external_calls() {
        let f = fixture(Duration::from_secs(5));
        let request = GenerationRequest::Article(ArticleRequest {
            prompt: None,
            length: Some(10),
        });

        let err = f.gateway.generate(&free_user(), request).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(f.text.calls(), 0);
    }

    #[tokio::test]
    async fn test_resume_review_extracts_then_completes() {
        let f = fixture(Duration::from_secs(5));
        let premium = AuthContext {
            user_id: "user_p".to_string(),
            plan: Plan::Premium,
        };
        let request = GenerationRequest::ResumeReview {
            resume: Some(crate::utils::upload::UploadedFile {
                filename: "cv.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                data: bytes::Bytes::from_static(b"%PDF-1.4 resume"),
            }),
        };

        let outcome = f.gateway.generate(&premium, request).await.unwrap();

        assert_eq!(outcome.free_usage, None);
        assert_eq!(f.documents.calls(), 1);
        let sent = f.text.last_request().unwrap();
        assert!(sent.prompt.contains("Jane Doe, engineer"));
        assert_eq!(sent.max_tokens, 1000);
        assert_eq!(outcome.record.prompt, "Review the uploaded resume");
    }

    #[tokio::test]
    async fn test_extraction_failure_is_fatal() {
        let f = fixture(Duration::from_secs(5));
        f.documents.set_failing(true);
        let premium = AuthContext {
            user_id: "user_p".to_string(),
            plan: Plan::Premium,
        };
        let request = GenerationRequest::ResumeReview {
            resume: Some(crate::utils::upload::UploadedFile {
                filename: "cv.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                data: bytes::Bytes::from_static(b"%PDF-1.4 resume"),
            }),
        };

        let err = f.gateway.generate(&premium, request).await.unwrap_err();

        assert!(matches!(err, AppError::ExternalService { ref service, .. } if service == "document extractor"));
        assert_eq!(f.text.calls(), 0);
        assert!(f.creations.is_empty());
    }

    #[tokio::test]
    async fn test_abandoned_request_still_settles_its_slot() {
        let f = fixture(Duration::from_secs(5));
        f.ledger.set_free_usage("user_free", 9);
        f.text.set_delay(Some(Duration::from_millis(200)));

        // The caller gives up while the capability call is in flight.
        let abandoned = tokio::time::timeout(
            Duration::from_millis(20),
            f.gateway.generate(&free_user(), article()),
        )
        .await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(f.ledger.reserved_of("user_free"), 0);
        assert_eq!(f.ledger.free_usage_of("user_free"), 10);
        assert_eq!(f.creations.len(), 1);
    }

    #[tokio::test]
    async fn test_abandoned_failing_request_returns_its_slot() {
        let f = fixture(Duration::from_secs(5));
        f.ledger.set_free_usage("user_free", 9);
        f.text.set_failing(true);
        f.text.set_delay(Some(Duration::from_millis(100)));

        let abandoned = tokio::time::timeout(
            Duration::from_millis(20),
            f.gateway.generate(&free_user(), article()),
        )
        .await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(f.ledger.reserved_of("user_free"), 0);
        assert_eq!(f.ledger.free_usage_of("user_free"), 9);
        assert!(f.creations.is_empty());

        f.text.set_failing(false);
        f.text.set_delay(None);
        let outcome = f.gateway.generate(&free_user(), article()).await.unwrap();
        assert_eq!(outcome.free_usage, Some(10));
    }

    #[tokio::test]
    async fn test_commit_failure_still_serves_the_creation() {
        let f = fixture(Duration::from_secs(5));
        f.ledger.fail_commits(true);

        let outcome = f.gateway.generate(&free_user(), article()).await.unwrap();

        assert_eq!(outcome.free_usage, None);
        assert_eq!(f.creations.len(), 1);
        // Held until the lease runs out, never permanently.
        assert_eq!(f.ledger.reserved_of("user_free"), 1);
    }

    #[tokio::test]
    async fn test_limit_error_reports_committed_usage() {
        let f = fixture(Duration::from_secs(5));
        f.ledger.set_free_usage("user_free", 9);
        let in_flight = f
            .ledger
            .try_reserve("user_free", FREE_USAGE_LIMIT, Duration::from_secs(60))
            .await
            .unwrap();
        assert!(in_flight.is_some());

        let err = f.gateway.generate(&free_user(), article()).await.unwrap_err();

        assert!(matches!(err, AppError::UsageLimitExceeded { used: 9, limit: 10 }));
        assert_eq!(f.text.calls(), 0);
    }

    #[test]
    fn test_lease_outlives_both_resume_calls() {
        let limits = GenerationLimits {
            max_article_tokens: 4096,
            external_call_timeout: Duration::from_secs(60),
        };
        assert_eq!(limits.reservation_lease(), Duration::from_secs(180));
    }
}
