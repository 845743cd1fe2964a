use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::quota::PlanGate;

/// Kind of generation a creation record was produced by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum CreationKind {
    Article,
    BlogTitle,
    Image,
    BackgroundRemoval,
    ObjectRemoval,
    ResumeReview,
    Summary,
    Translation,
    SocialCaption,
    Email,
}

/// Name of the JSON field a successful response carries its content in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseField {
    Content,
    Translation,
    Caption,
    Email,
}

impl CreationKind {
    pub const ALL: [CreationKind; 10] = [
        CreationKind::Article,
        CreationKind::BlogTitle,
        CreationKind::Image,
        CreationKind::BackgroundRemoval,
        CreationKind::ObjectRemoval,
        CreationKind::ResumeReview,
        CreationKind::Summary,
        CreationKind::Translation,
        CreationKind::SocialCaption,
        CreationKind::Email,
    ];

    /// Value stored in the `type` column of the creations table
    pub fn as_str(&self) -> &'static str {
        match self {
            CreationKind::Article => "article",
            CreationKind::BlogTitle => "blog-title",
            CreationKind::Image => "image",
            CreationKind::BackgroundRemoval => "background-removal",
            CreationKind::ObjectRemoval => "object-removal",
            CreationKind::ResumeReview => "resume-review",
            CreationKind::Summary => "summary",
            CreationKind::Translation => "translation",
            CreationKind::SocialCaption => "social-caption",
            CreationKind::Email => "email",
        }
    }

    /// Only articles and blog titles are open to free callers (within quota).
    pub fn plan_gate(&self) -> PlanGate {
        match self {
            CreationKind::Article | CreationKind::BlogTitle => PlanGate::FreeWithQuota,
            _ => PlanGate::Premium,
        }
    }

    /// Whether the generated content is a reference to hosted media.
    pub fn produces_media(&self) -> bool {
        matches!(
            self,
            CreationKind::Image | CreationKind::BackgroundRemoval | CreationKind::ObjectRemoval
        )
    }

    pub fn response_field(&self) -> ResponseField {
        match self {
            CreationKind::Translation => ResponseField::Translation,
            CreationKind::SocialCaption => ResponseField::Caption,
            CreationKind::Email => ResponseField::Email,
            _ => ResponseField::Content,
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            CreationKind::Article => "Article generated successfully",
            CreationKind::BlogTitle => "Title generated successfully",
            CreationKind::Image => "Image generated successfully",
            CreationKind::BackgroundRemoval => "Background removed successfully",
            CreationKind::ObjectRemoval => "Object removed successfully",
            CreationKind::ResumeReview => "Resume reviewed, check out the feedback",
            CreationKind::Summary => "Text summarized successfully",
            CreationKind::Translation => "Translation completed",
            CreationKind::SocialCaption => "Caption generated",
            CreationKind::Email => "Email generated successfully",
        }
    }

    /// Human-readable feature name used in denial messages
    pub fn feature_name(&self) -> &'static str {
        match self {
            CreationKind::Article => "article writing",
            CreationKind::BlogTitle => "blog title generation",
            CreationKind::Image => "image generation",
            CreationKind::BackgroundRemoval => "background removal",
            CreationKind::ObjectRemoval => "object removal",
            CreationKind::ResumeReview => "resume review",
            CreationKind::Summary => "text summarization",
            CreationKind::Translation => "translation",
            CreationKind::SocialCaption => "social caption generation",
            CreationKind::Email => "email writing",
        }
    }
}

impl Display for CreationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CreationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown creation kind: {}", s))
    }
}

/// One completed generation. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreationRecord {
    pub id: Uuid,
    pub user_id: String,
    pub prompt: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: CreationKind,
    pub publish: bool,
    pub created_at: DateTime<Utc>,
}

/// Values for a creation record that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewCreation {
    pub user_id: String,
    pub kind: CreationKind,
    pub prompt: String,
    pub content: String,
    pub publish: bool,
}

impl NewCreation {
    /// Build a private record. Only image creations may later be published.
    pub fn new(
        user_id: impl Into<String>,
        kind: CreationKind,
        prompt: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            prompt: prompt.into(),
            content: content.into(),
            publish: false,
        }
    }

    pub fn published(mut self, publish: bool) -> Self {
        self.publish = publish && self.kind == CreationKind::Image;
        self
    }

    /// Materialize the record with a fresh id and timestamp.
    pub fn into_record(self) -> CreationRecord {
        CreationRecord {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            prompt: self.prompt,
            content: self.content,
            kind: self.kind,
            publish: self.publish,
            created_at: Utc::now(),
        }
    }
}
