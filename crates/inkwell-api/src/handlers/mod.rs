pub mod creations;
pub mod edit;
pub mod generate;
pub mod health;

use inkwell_core::models::ResponseField;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::GenerationOutcome;

/// Successful generation. The output is carried in `content`, except for
/// translations (`translation`), social captions (`caption`) and emails
/// (`email`).
#[derive(Debug, Serialize, ToSchema)]
pub struct GenerationResponse {
    /// Always `true`
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub creation_id: Uuid,
    /// Free-tier generations used so far, for metered callers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_usage: Option<i32>,
}

impl From<GenerationOutcome> for GenerationResponse {
    fn from(outcome: GenerationOutcome) -> Self {
        let record = outcome.record;
        let mut response = GenerationResponse {
            success: true,
            message: record.kind.success_message().to_string(),
            content: None,
            translation: None,
            caption: None,
            email: None,
            creation_id: record.id,
            free_usage: outcome.free_usage,
        };
        let slot = match record.kind.response_field() {
            ResponseField::Content => &mut response.content,
            ResponseField::Translation => &mut response.translation,
            ResponseField::Caption => &mut response.caption,
            ResponseField::Email => &mut response.email,
        };
        *slot = Some(record.content);
        response
    }
}
