use crate::auth::session::SessionVerifier;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use inkwell_core::AppError;
use std::sync::Arc;

/// Require a valid bearer session token and attach the caller's
/// [`AuthContext`](crate::auth::models::AuthContext) to the request.
pub async fn auth_middleware(
    State(verifier): State<Arc<SessionVerifier>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthenticated(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return HttpAppError(AppError::Unauthenticated(
            "Invalid authorization header format".to_string(),
        ))
        .into_response();
    };

    match verifier.verify(token.trim()).await {
        Ok(context) => {
            tracing::Span::current().record("user_id", context.user_id.as_str());
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Err(e) => HttpAppError(e).into_response(),
    }
}
