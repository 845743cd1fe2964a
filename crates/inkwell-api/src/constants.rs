//! API path prefixes

/// Generation endpoints
pub const AI_PREFIX: &str = "/api/ai";

/// Per-user creation listings
pub const USER_PREFIX: &str = "/api/user";

/// Multipart field carrying the image for editing endpoints
pub const IMAGE_FIELD: &str = "image";

/// Multipart field carrying the resume document
pub const RESUME_FIELD: &str = "resume";
