//! Route configuration and setup

use crate::auth::{auth_middleware, SessionVerifier};
use crate::constants::{AI_PREFIX, USER_PREFIX};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use inkwell_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Setup all application routes
pub fn setup_routes(
    config: &Config,
    state: Arc<AppState>,
) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;
    let verifier = SessionVerifier::from_config(config);

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1_000)
        .max(1);

    tracing::info!(
        max_upload_mb = config.max_upload_size_bytes() / 1024 / 1024,
        http_concurrency_limit = http_concurrency_limit,
        "Routes configured"
    );

    Ok(app_router(state, verifier, config.max_upload_size_bytes())
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(cors))
}

/// Every route with authentication, body limit and request tracing applied.
pub fn app_router(
    state: Arc<AppState>,
    verifier: Arc<SessionVerifier>,
    max_body_bytes: usize,
) -> Router {
    public_routes(state.clone())
        .merge(protected_routes(state, verifier))
        // Multipart uploads are bounded by the request body limit below
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    user_id = tracing::field::Empty,
                )
            }),
        )
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Public routes (no authentication required)
fn public_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .with_state(state)
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::ApiDoc::openapi()) }),
        )
}

/// Routes that require a verified session
fn protected_routes(state: Arc<AppState>, verifier: Arc<SessionVerifier>) -> Router {
    let ai = Router::new()
        .route(
            "/generate-article",
            post(handlers::generate::generate_article),
        )
        .route(
            "/generate-blog-title",
            post(handlers::generate::generate_blog_title),
        )
        .route("/generate-image", post(handlers::generate::generate_image))
        .route(
            "/remove-image-background",
            post(handlers::edit::remove_image_background),
        )
        .route(
            "/remove-image-object",
            post(handlers::edit::remove_image_object),
        )
        .route("/resume-review", post(handlers::edit::resume_review))
        .route("/summarize-text", post(handlers::generate::summarize_text))
        .route("/translate-text", post(handlers::generate::translate_text))
        .route(
            "/generate-social-caption",
            post(handlers::generate::generate_social_caption),
        )
        .route("/generate-email", post(handlers::generate::generate_email));

    let user = Router::new()
        .route(
            "/get-user-creations",
            get(handlers::creations::get_user_creations),
        )
        .route(
            "/get-published-creations",
            get(handlers::creations::get_published_creations),
        );

    Router::new()
        .nest(AI_PREFIX, ai)
        .nest(USER_PREFIX, user)
        .route_layer(axum::middleware::from_fn_with_state(
            verifier,
            auth_middleware,
        ))
        .with_state(state)
}
