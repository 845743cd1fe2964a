//! JSON generation endpoints

use crate::auth::AuthContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::GenerationResponse;
use crate::services::generation::{
    ArticleRequest, BlogTitleRequest, EmailRequest, ImageRequest, SocialCaptionRequest,
    SummaryRequest, TranslationRequest,
};
use crate::services::GenerationRequest;
use crate::state::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;

async fn run(
    state: &AppState,
    auth: &AuthContext,
    request: GenerationRequest,
) -> Result<Json<GenerationResponse>, HttpAppError> {
    let outcome = state.gateway.generate(auth, request).await?;
    Ok(Json(GenerationResponse::from(outcome)))
}

#[utoipa::path(
    post,
    path = "/api/ai/generate-article",
    tag = "generation",
    request_body = ArticleRequest,
    responses(
        (status = 200, description = "Article generated", body = GenerationResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
        (status = 402, description = "Free usage limit reached", body = ErrorResponse),
        (status = 502, description = "Language model failed", body = ErrorResponse),
        (status = 504, description = "Language model timed out", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn generate_article(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    ValidatedJson(body): ValidatedJson<ArticleRequest>,
) -> Result<Json<GenerationResponse>, HttpAppError> {
    run(&state, &auth, GenerationRequest::Article(body)).await
}

#[utoipa::path(
    post,
    path = "/api/ai/generate-blog-title",
    tag = "generation",
    request_body = BlogTitleRequest,
    responses(
        (status = 200, description = "Titles generated", body = GenerationResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 402, description = "Free usage limit reached", body = ErrorResponse),
        (status = 502, description = "Language model failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn generate_blog_title(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    ValidatedJson(body): ValidatedJson<BlogTitleRequest>,
) -> Result<Json<GenerationResponse>, HttpAppError> {
    run(&state, &auth, GenerationRequest::BlogTitle(body)).await
}

#[utoipa::path(
    post,
    path = "/api/ai/generate-image",
    tag = "generation",
    request_body = ImageRequest,
    responses(
        (status = 200, description = "Image generated", body = GenerationResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Premium plan required", body = ErrorResponse),
        (status = 502, description = "Image generator failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    ValidatedJson(body): ValidatedJson<ImageRequest>,
) -> Result<Json<GenerationResponse>, HttpAppError> {
    run(&state, &auth, GenerationRequest::Image(body)).await
}

#[utoipa::path(
    post,
    path = "/api/ai/summarize-text",
    tag = "generation",
    request_body = SummaryRequest,
    responses(
        (status = 200, description = "Text summarized", body = GenerationResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Premium plan required", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn summarize_text(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    ValidatedJson(body): ValidatedJson<SummaryRequest>,
) -> Result<Json<GenerationResponse>, HttpAppError> {
    run(&state, &auth, GenerationRequest::Summary(body)).await
}

#[utoipa::path(
    post,
    path = "/api/ai/translate-text",
    tag = "generation",
    request_body = TranslationRequest,
    responses(
        (status = 200, description = "Translation in the `translation` field", body = GenerationResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Premium plan required", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn translate_text(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    ValidatedJson(body): ValidatedJson<TranslationRequest>,
) -> Result<Json<GenerationResponse>, HttpAppError> {
    run(&state, &auth, GenerationRequest::Translation(body)).await
}

#[utoipa::path(
    post,
    path = "/api/ai/generate-social-caption",
    tag = "generation",
    request_body = SocialCaptionRequest,
    responses(
        (status = 200, description = "Caption in the `caption` field", body = GenerationResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Premium plan required", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn generate_social_caption(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    ValidatedJson(body): ValidatedJson<SocialCaptionRequest>,
) -> Result<Json<GenerationResponse>, HttpAppError> {
    run(&state, &auth, GenerationRequest::SocialCaption(body)).await
}

#[utoipa::path(
    post,
    path = "/api/ai/generate-email",
    tag = "generation",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Email in the `email` field", body = GenerationResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Premium plan required", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn generate_email(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    ValidatedJson(body): ValidatedJson<EmailRequest>,
) -> Result<Json<GenerationResponse>, HttpAppError> {
    run(&state, &auth, GenerationRequest::Email(body)).await
}
