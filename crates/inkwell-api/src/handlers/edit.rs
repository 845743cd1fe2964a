//! Multipart endpoints: image editing and resume review

use crate::auth::AuthContext;
use crate::constants::{IMAGE_FIELD, RESUME_FIELD};
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::GenerationResponse;
use crate::services::GenerationRequest;
use crate::state::AppState;
use crate::utils::upload::read_multipart;
use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/ai/remove-image-background",
    tag = "editing",
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Field `image`: the image to edit"),
    responses(
        (status = 200, description = "Background removed", body = GenerationResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Premium plan required", body = ErrorResponse),
        (status = 502, description = "Media host failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_image_background(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    multipart: Multipart,
) -> Result<Json<GenerationResponse>, HttpAppError> {
    let mut form = read_multipart(multipart).await?;
    let request = GenerationRequest::BackgroundRemoval {
        image: form.take_file(IMAGE_FIELD),
    };
    let outcome = state.gateway.generate(&auth, request).await?;
    Ok(Json(GenerationResponse::from(outcome)))
}

#[utoipa::path(
    post,
    path = "/api/ai/remove-image-object",
    tag = "editing",
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Field `image`: the image to edit. Field `object`: a single-word object name"),
    responses(
        (status = 200, description = "Object removed", body = GenerationResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Premium plan required", body = ErrorResponse),
        (status = 502, description = "Media host failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_image_object(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    multipart: Multipart,
) -> Result<Json<GenerationResponse>, HttpAppError> {
    let mut form = read_multipart(multipart).await?;
    let request = GenerationRequest::ObjectRemoval {
        image: form.take_file(IMAGE_FIELD),
        object: form.take_field("object"),
    };
    let outcome = state.gateway.generate(&auth, request).await?;
    Ok(Json(GenerationResponse::from(outcome)))
}

#[utoipa::path(
    post,
    path = "/api/ai/resume-review",
    tag = "editing",
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Field `resume`: a PDF of at most 5 MiB"),
    responses(
        (status = 200, description = "Resume reviewed", body = GenerationResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Premium plan required", body = ErrorResponse),
        (status = 413, description = "Resume exceeds allowed size", body = ErrorResponse),
        (status = 502, description = "Extraction or language model failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn resume_review(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    multipart: Multipart,
) -> Result<Json<GenerationResponse>, HttpAppError> {
    let mut form = read_multipart(multipart).await?;
    let request = GenerationRequest::ResumeReview {
        resume: form.take_file(RESUME_FIELD),
    };
    let outcome = state.gateway.generate(&auth, request).await?;
    Ok(Json(GenerationResponse::from(outcome)))
}
