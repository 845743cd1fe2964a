//! Fixed limits and model parameters.

/// Number of free-tier generations a non-premium identity may consume.
pub const FREE_USAGE_LIMIT: i32 = 10;

/// Largest resume accepted for review (5 MiB).
pub const RESUME_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Upper bound on the caller-supplied article length when not configured.
pub const DEFAULT_MAX_ARTICLE_TOKENS: u32 = 4096;

/// Default bound on every call to an external capability.
pub const DEFAULT_EXTERNAL_CALL_TIMEOUT_SECS: u64 = 60;

/// Added to the longest possible pipeline run when sizing a free-tier
/// reservation lease.
pub const RESERVATION_LEASE_MARGIN_SECS: u64 = 60;

/// Maximum number of records returned by the community feed.
pub const PUBLISHED_FEED_LIMIT: i64 = 100;

pub const BLOG_TITLE_MAX_TOKENS: u32 = 100;
pub const RESUME_REVIEW_MAX_TOKENS: u32 = 1000;
pub const TRANSLATION_MAX_TOKENS: u32 = 500;
pub const SOCIAL_CAPTION_MAX_TOKENS: u32 = 300;
pub const EMAIL_MAX_TOKENS: u32 = 300;

pub const CREATIVE_TEMPERATURE: f32 = 0.7;
pub const STYLED_TEMPERATURE: f32 = 0.3;
pub const PRECISE_TEMPERATURE: f32 = 0.0;
