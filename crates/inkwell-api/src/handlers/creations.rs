//! Creation history and community feed

use crate::auth::AuthContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{extract::State, Json};
use inkwell_core::constants::PUBLISHED_FEED_LIMIT;
use inkwell_core::models::CreationRecord;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct CreationsResponse {
    pub success: bool,
    pub creations: Vec<CreationRecord>,
}

#[utoipa::path(
    get,
    path = "/api/user/get-user-creations",
    tag = "creations",
    responses(
        (status = 200, description = "Caller's creations, newest first", body = CreationsResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn get_user_creations(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
) -> Result<Json<CreationsResponse>, HttpAppError> {
    let creations = state.creations.list_for_user(&auth.user_id).await?;
    Ok(Json(CreationsResponse {
        success: true,
        creations,
    }))
}

#[utoipa::path(
    get,
    path = "/api/user/get-published-creations",
    tag = "creations",
    responses(
        (status = 200, description = "Published images from all users, newest first", body = CreationsResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_published_creations(
    State(state): State<Arc<AppState>>,
    _auth: AuthContext,
) -> Result<Json<CreationsResponse>, HttpAppError> {
    let creations = state.creations.list_published(PUBLISHED_FEED_LIMIT).await?;
    Ok(Json(CreationsResponse {
        success: true,
        creations,
    }))
}
