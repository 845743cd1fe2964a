//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use crate::services::generation::request;
use inkwell_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inkwell API",
        version = "0.1.0",
        description = "Content generation gateway. Articles and blog titles are open to free accounts within a free-tier quota; every other generation requires a premium plan."
    ),
    paths(
        // Generation
        handlers::generate::generate_article,
        handlers::generate::generate_blog_title,
        handlers::generate::generate_image,
        handlers::generate::summarize_text,
        handlers::generate::translate_text,
        handlers::generate::generate_social_caption,
        handlers::generate::generate_email,
        // Editing
        handlers::edit::remove_image_background,
        handlers::edit::remove_image_object,
        handlers::edit::resume_review,
        // Creations
        handlers::creations::get_user_creations,
        handlers::creations::get_published_creations,
        handlers::health::health_check,
    ),
    components(
        schemas(
            request::ArticleRequest,
            request::BlogTitleRequest,
            request::ImageRequest,
            request::SummaryRequest,
            request::TranslationRequest,
            request::SocialCaptionRequest,
            request::EmailRequest,
            handlers::GenerationResponse,
            handlers::creations::CreationsResponse,
            handlers::health::HealthCheckResponse,
            models::CreationRecord,
            models::CreationKind,
            error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "generation", description = "Text and image generation"),
        (name = "editing", description = "Image editing and resume review from uploads"),
        (name = "creations", description = "Creation history and community feed"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
