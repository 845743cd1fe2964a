//! Request payloads and their validation into a generation task
//!
//! Every payload field is optional at the serde level so that a missing field
//! surfaces as a validation failure naming the field, not as a body rejection.
//! Presence and range rules live on the payloads as `validator` attributes;
//! rules that depend on configuration or on uploaded bytes are checked here.

use bytes::Bytes;
use inkwell_core::constants::{
    BLOG_TITLE_MAX_TOKENS, CREATIVE_TEMPERATURE, EMAIL_MAX_TOKENS, PRECISE_TEMPERATURE,
    RESUME_MAX_BYTES, RESUME_REVIEW_MAX_TOKENS, SOCIAL_CAPTION_MAX_TOKENS, STYLED_TEMPERATURE,
    TRANSLATION_MAX_TOKENS,
};
use inkwell_core::models::{CreationKind, SummaryLength};
use inkwell_core::AppError;
use inkwell_providers::{CompletionRequest, ImageUpload};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::prompts;
use super::GenerationLimits;
use crate::utils::upload::UploadedFile;

const PDF_MAGIC: &[u8] = b"%PDF";

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct ArticleRequest {
    #[validate(
        required(message = "prompt is required"),
        length(min = 1, message = "prompt is required")
    )]
    pub prompt: Option<String>,
    /// Output bound in tokens
    #[validate(
        required(message = "length is required"),
        range(min = 1, message = "length must be a positive number of tokens")
    )]
    pub length: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct BlogTitleRequest {
    #[validate(
        required(message = "prompt is required"),
        length(min = 1, message = "prompt is required")
    )]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct ImageRequest {
    #[validate(
        required(message = "prompt is required"),
        length(min = 1, message = "prompt is required")
    )]
    pub prompt: Option<String>,
    /// Share the image on the community feed
    pub publish: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct SummaryRequest {
    #[validate(
        required(message = "input is required"),
        length(min = 1, message = "input is required")
    )]
    pub input: Option<String>,
    /// One of `short`, `medium`, `long`, `bullets`
    #[serde(rename = "type")]
    #[validate(
        required(message = "type is required"),
        length(min = 1, message = "type is required")
    )]
    pub summary_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequest {
    #[validate(
        required(message = "input is required"),
        length(min = 1, message = "input is required")
    )]
    pub input: Option<String>,
    #[validate(
        required(message = "targetLanguage is required"),
        length(min = 1, message = "targetLanguage is required")
    )]
    pub target_language: Option<String>,
    #[validate(
        required(message = "tone is required"),
        length(min = 1, message = "tone is required")
    )]
    pub tone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct SocialCaptionRequest {
    #[validate(
        required(message = "topic is required"),
        length(min = 1, message = "topic is required")
    )]
    pub topic: Option<String>,
    #[validate(
        required(message = "platform is required"),
        length(min = 1, message = "platform is required")
    )]
    pub platform: Option<String>,
    #[validate(
        required(message = "tone is required"),
        length(min = 1, message = "tone is required")
    )]
    pub tone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    #[validate(
        required(message = "subject is required"),
        length(min = 1, message = "subject is required")
    )]
    pub subject: Option<String>,
    #[validate(
        required(message = "details is required"),
        length(min = 1, message = "details is required")
    )]
    pub details: Option<String>,
    #[validate(
        required(message = "tone is required"),
        length(min = 1, message = "tone is required")
    )]
    pub tone: Option<String>,
    #[validate(
        required(message = "emailType is required"),
        length(min = 1, message = "emailType is required")
    )]
    pub email_type: Option<String>,
}

/// A request for one generation, before validation
#[derive(Debug, Clone)]
pub enum GenerationRequest {
    Article(ArticleRequest),
    BlogTitle(BlogTitleRequest),
    Image(ImageRequest),
    BackgroundRemoval {
        image: Option<UploadedFile>,
    },
    ObjectRemoval {
        image: Option<UploadedFile>,
        object: Option<String>,
    },
    ResumeReview {
        resume: Option<UploadedFile>,
    },
    Summary(SummaryRequest),
    Translation(TranslationRequest),
    SocialCaption(SocialCaptionRequest),
    Email(EmailRequest),
}

/// Work handed to the external capabilities
#[derive(Debug, Clone)]
pub enum GenerationTask {
    Complete(CompletionRequest),
    SynthesizeImage { prompt: String },
    RemoveBackground(ImageUpload),
    RemoveObject { image: ImageUpload, object: String },
    ReviewResume { document: Bytes },
}

/// A validated generation: what to run and what to record.
#[derive(Debug, Clone)]
pub struct GenerationInput {
    pub kind: CreationKind,
    pub task: GenerationTask,
    /// Prompt stored with the creation record
    pub recorded_prompt: String,
    pub publish: bool,
}

impl GenerationInput {
    fn completion(kind: CreationKind, prompt: String, max_tokens: u32, temperature: f32) -> Self {
        Self {
            kind,
            task: GenerationTask::Complete(CompletionRequest::new(
                prompt.clone(),
                max_tokens,
                temperature,
            )),
            recorded_prompt: prompt,
            publish: false,
        }
    }
}

/// Trimmed field value. Whitespace-only input counts as missing.
fn trimmed(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("{} is required", field)))
}

fn required_file(file: Option<UploadedFile>, field: &str) -> Result<UploadedFile, AppError> {
    file.filter(|f| !f.is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("{} file is required", field)))
}

fn image_upload(file: Option<UploadedFile>) -> Result<ImageUpload, AppError> {
    let file = required_file(file, "image")?;
    if !file.mime_type().starts_with("image/") {
        return Err(AppError::InvalidInput(
            "Uploaded file must be an image".to_string(),
        ));
    }
    Ok(ImageUpload {
        filename: file.filename,
        content_type: file.content_type,
        data: file.data,
    })
}

/// Upper bound on the article length comes from configuration.
fn article_length(length: Option<i64>, max: u32) -> Result<u32, AppError> {
    let length = length.ok_or_else(|| AppError::InvalidInput("length is required".to_string()))?;
    u32::try_from(length)
        .ok()
        .filter(|l| (1..=max).contains(l))
        .ok_or_else(|| {
            AppError::InvalidInput(format!("length must be between 1 and {}", max))
        })
}

impl GenerationRequest {
    pub fn kind(&self) -> CreationKind {
        match self {
            GenerationRequest::Article(_) => CreationKind::Article,
            GenerationRequest::BlogTitle(_) => CreationKind::BlogTitle,
            GenerationRequest::Image(_) => CreationKind::Image,
            GenerationRequest::BackgroundRemoval { .. } => CreationKind::BackgroundRemoval,
            GenerationRequest::ObjectRemoval { .. } => CreationKind::ObjectRemoval,
            GenerationRequest::ResumeReview { .. } => CreationKind::ResumeReview,
            GenerationRequest::Summary(_) => CreationKind::Summary,
            GenerationRequest::Translation(_) => CreationKind::Translation,
            GenerationRequest::SocialCaption(_) => CreationKind::SocialCaption,
            GenerationRequest::Email(_) => CreationKind::Email,
        }
    }

    /// Check required inputs and build the task. Runs before any identity,
    /// plan or quota work and never touches an external service.
    pub fn validate(self, limits: &GenerationLimits) -> Result<GenerationInput, AppError> {
        let kind = self.kind();
        let input = match self {
            GenerationRequest::Article(req) => {
                req.validate()?;
                let prompt = trimmed(req.prompt, "prompt")?;
                let length = article_length(req.length, limits.max_article_tokens)?;
                GenerationInput::completion(kind, prompt, length, CREATIVE_TEMPERATURE)
            }
            GenerationRequest::BlogTitle(req) => {
                req.validate()?;
                let prompt = trimmed(req.prompt, "prompt")?;
                GenerationInput::completion(
                    kind,
                    prompt,
                    BLOG_TITLE_MAX_TOKENS,
                    CREATIVE_TEMPERATURE,
                )
            }
            GenerationRequest::Image(req) => {
                req.validate()?;
                let prompt = trimmed(req.prompt, "prompt")?;
                GenerationInput {
                    kind,
                    task: GenerationTask::SynthesizeImage {
                        prompt: prompt.clone(),
                    },
                    recorded_prompt: prompt,
                    publish: req.publish.unwrap_or(false),
                }
            }
            GenerationRequest::BackgroundRemoval { image } => GenerationInput {
                kind,
                task: GenerationTask::RemoveBackground(image_upload(image)?),
                recorded_prompt: "Remove background from the image".to_string(),
                publish: false,
            },
            GenerationRequest::ObjectRemoval { image, object } => {
                let object = trimmed(object, "object")?;
                if object.split_whitespace().count() > 1 {
                    return Err(AppError::InvalidInput(
                        "Please enter only one object name".to_string(),
                    ));
                }
                GenerationInput {
                    kind,
                    task: GenerationTask::RemoveObject {
                        image: image_upload(image)?,
                        object: object.clone(),
                    },
                    recorded_prompt: format!("Removed {} from image", object),
                    publish: false,
                }
            }
            GenerationRequest::ResumeReview { resume } => {
                let resume = required_file(resume, "resume")?;
                if resume.len() > RESUME_MAX_BYTES {
                    return Err(AppError::PayloadTooLarge(format!(
                        "Resume file size exceeds allowed size ({} MB)",
                        RESUME_MAX_BYTES / 1024 / 1024
                    )));
                }
                if !resume.data.starts_with(PDF_MAGIC) && resume.mime_type() != "application/pdf"
                {
                    return Err(AppError::InvalidInput(
                        "Resume must be a PDF document".to_string(),
                    ));
                }
                GenerationInput {
                    kind,
                    task: GenerationTask::ReviewResume {
                        document: resume.data,
                    },
                    recorded_prompt: "Review the uploaded resume".to_string(),
                    publish: false,
                }
            }
            GenerationRequest::Summary(req) => {
                req.validate()?;
                let text = trimmed(req.input, "input")?;
                let length = trimmed(req.summary_type, "type")?
                    .parse::<SummaryLength>()
                    .map_err(AppError::InvalidInput)?;
                GenerationInput::completion(
                    kind,
                    prompts::summary(&text, length),
                    length.max_tokens(),
                    PRECISE_TEMPERATURE,
                )
            }
            GenerationRequest::Translation(req) => {
                req.validate()?;
                let text = trimmed(req.input, "input")?;
                let target_language = trimmed(req.target_language, "targetLanguage")?;
                let tone = trimmed(req.tone, "tone")?;
                GenerationInput::completion(
                    kind,
                    prompts::translation(&text, &target_language, &tone),
                    TRANSLATION_MAX_TOKENS,
                    PRECISE_TEMPERATURE,
                )
            }
            GenerationRequest::SocialCaption(req) => {
                req.validate()?;
                let topic = trimmed(req.topic, "topic")?;
                let platform = trimmed(req.platform, "platform")?;
                let tone = trimmed(req.tone, "tone")?;
                GenerationInput::completion(
                    kind,
                    prompts::social_caption(&topic, &platform, &tone),
                    SOCIAL_CAPTION_MAX_TOKENS,
                    STYLED_TEMPERATURE,
                )
            }
            GenerationRequest::Email(req) => {
                req.validate()?;
                let subject = trimmed(req.subject, "subject")?;
                let details = trimmed(req.details, "details")?;
                let tone = trimmed(req.tone, "tone")?;
                let email_type = trimmed(req.email_type, "emailType")?;
                GenerationInput::completion(
                    kind,
                    prompts::email(&subject, &details, &tone, &email_type),
                    EMAIL_MAX_TOKENS,
                    STYLED_TEMPERATURE,
                )
            }
        };
        Ok(input)
    }
}

/// Completion for the resume review once its text has been extracted.
pub(super) fn resume_review_completion(resume_text: &str) -> CompletionRequest {
    CompletionRequest::new(
        prompts::resume_review(resume_text),
        RESUME_REVIEW_MAX_TOKENS,
        PRECISE_TEMPERATURE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn limits() -> GenerationLimits {
        GenerationLimits {
            max_article_tokens: 4096,
            external_call_timeout: Duration::from_secs(60),
        }
    }

    fn file(name: &str, content_type: &str, data: Vec<u8>) -> Option<UploadedFile> {
        Some(UploadedFile {
            filename: name.to_string(),
            content_type: content_type.to_string(),
            data: Bytes::from(data),
        })
    }

    fn invalid(result: Result<GenerationInput, AppError>) -> String {
        match result {
            Err(AppError::InvalidInput(msg)) => msg,
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_article_builds_bounded_completion() {
        let input = GenerationRequest::Article(ArticleRequest {
            prompt: Some("Write about oceans".to_string()),
            length: Some(200),
        })
        .validate(&limits())
        .unwrap();

        assert_eq!(input.kind, CreationKind::Article);
        assert_eq!(input.recorded_prompt, "Write about oceans");
        match input.task {
            GenerationTask::Complete(req) => {
                assert_eq!(req.max_tokens, 200);
                assert_eq!(req.temperature, CREATIVE_TEMPERATURE);
            }
            other => panic!("unexpected task {:?}", other),
        }
    }

    #[test]
    fn test_article_length_bounds() {
        for length in [Some(0), Some(-5), Some(4097), None] {
            let result = GenerationRequest::Article(ArticleRequest {
                prompt: Some("x".to_string()),
                length,
            })
            .validate(&limits());
            assert!(invalid(result).contains("length"));
        }
    }

    #[test]
    fn test_blank_prompt_is_missing() {
        let result = GenerationRequest::BlogTitle(BlogTitleRequest {
            prompt: Some("   ".to_string()),
        })
        .validate(&limits());
        assert_eq!(invalid(result), "prompt is required");
    }

    #[test]
    fn test_object_must_be_single_word() {
        let result = GenerationRequest::ObjectRemoval {
            image: file("car.png", "image/png", b"png".to_vec()),
            object: Some("red car".to_string()),
        }
        .validate(&limits());
        assert!(invalid(result).contains("one object"));

        let input = GenerationRequest::ObjectRemoval {
            image: file("car.png", "image/png", b"png".to_vec()),
            object: Some(" car ".to_string()),
        }
        .validate(&limits())
        .unwrap();
        assert_eq!(input.recorded_prompt, "Removed car from image");
    }

    #[test]
    fn test_non_image_upload_rejected() {
        let result = GenerationRequest::BackgroundRemoval {
            image: file("notes.txt", "text/plain", b"hello".to_vec()),
        }
        .validate(&limits());
        assert!(invalid(result).contains("image"));
    }

    #[test]
    fn test_oversized_resume_rejected_before_type_check() {
        let result = GenerationRequest::ResumeReview {
            resume: file("cv.bin", "application/octet-stream", vec![0u8; 6 * 1024 * 1024]),
        }
        .validate(&limits());
        match result {
            Err(AppError::PayloadTooLarge(msg)) => assert!(msg.contains("exceeds allowed size")),
            other => panic!("expected PayloadTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_resume_must_be_pdf() {
        let result = GenerationRequest::ResumeReview {
            resume: file("cv.docx", "application/msword", b"PK\x03\x04".to_vec()),
        }
        .validate(&limits());
        assert!(invalid(result).contains("PDF"));

        let input = GenerationRequest::ResumeReview {
            resume: file("cv", "application/octet-stream", b"%PDF-1.7 ...".to_vec()),
        }
        .validate(&limits())
        .unwrap();
        assert_eq!(input.recorded_prompt, "Review the uploaded resume");
    }

    #[test]
    fn test_summary_type_sets_token_bound() {
        let input = GenerationRequest::Summary(SummaryRequest {
            input: Some("Long text".to_string()),
            summary_type: Some("Long".to_string()),
        })
        .validate(&limits())
        .unwrap();
        match input.task {
            GenerationTask::Complete(req) => {
                assert_eq!(req.max_tokens, 1300);
                assert_eq!(req.temperature, PRECISE_TEMPERATURE);
            }
            other => panic!("unexpected task {:?}", other),
        }

        let result = GenerationRequest::Summary(SummaryRequest {
            input: Some("Long text".to_string()),
            summary_type: Some("tiny".to_string()),
        })
        .validate(&limits());
        assert!(invalid(result).contains("Unknown summary type"));
    }

    #[test]
    fn test_email_requires_every_field() {
        let result = GenerationRequest::Email(EmailRequest {
            subject: Some("Hi".to_string()),
            details: Some("Details".to_string()),
            tone: Some("warm".to_string()),
            email_type: None,
        })
        .validate(&limits());
        assert_eq!(invalid(result), "emailType is required");
    }

    #[test]
    fn test_payload_rules_report_wire_field_names() {
        let result = GenerationRequest::Translation(TranslationRequest {
            input: Some("Hola".to_string()),
            target_language: None,
            tone: None,
        })
        .validate(&limits());
        assert_eq!(invalid(result), "targetLanguage is required");

        let result = GenerationRequest::Image(ImageRequest {
            prompt: Some(String::new()),
            publish: None,
        })
        .validate(&limits());
        assert_eq!(invalid(result), "prompt is required");

        let result = GenerationRequest::Article(ArticleRequest {
            prompt: Some("x".to_string()),
            length: Some(0),
        })
        .validate(&limits());
        assert!(invalid(result).contains("positive"));
    }

    #[test]
    fn test_image_publish_flag_carried() {
        let input = GenerationRequest::Image(ImageRequest {
            prompt: Some("A lighthouse".to_string()),
            publish: Some(true),
        })
        .validate(&limits())
        .unwrap();
        assert!(input.publish);
    }

    #[test]
    fn test_payload_field_names() {
        let req: TranslationRequest = serde_json::from_value(serde_json::json!({
            "input": "Hola",
            "targetLanguage": "English",
            "tone": "neutral"
        }))
        .unwrap();
        assert_eq!(req.target_language.as_deref(), Some("English"));

        let req: SummaryRequest =
            serde_json::from_value(serde_json::json!({"input": "x", "type": "short"})).unwrap();
        assert_eq!(req.summary_type.as_deref(), Some("short"));
    }
}
