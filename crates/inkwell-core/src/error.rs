//! Error types module
//!
//! All failures raised by the gateway are unified under `AppError`. Each
//! variant belongs to exactly one `FailureCategory`, which is how callers tell
//! validation problems apart from plan/quota denials and from failures of the
//! external capabilities or the creation store.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for denials and upstream trouble
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Coarse failure taxonomy reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    Unauthenticated,
    ValidationFailure,
    AuthorizationFailure,
    ExternalServiceFailure,
    StorageFailure,
    Internal,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "LIMIT_REACHED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Premium required: {0}")]
    SubscriptionRequired(String),

    #[error("Usage limit reached: {used}/{limit}")]
    UsageLimitExceeded { used: i32, limit: i32 },

    #[error("{service} request failed: {message}")]
    ExternalService { service: String, message: String },

    #[error("{service} did not respond within {seconds}s")]
    ExternalServiceTimeout { service: String, seconds: u64 },

    #[error("Generated {kind} could not be recorded")]
    CreationNotRecorded {
        kind: String,
        #[source]
        source: Box<AppError>,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// The first failing field (by name) becomes the message, so the same payload
/// always yields the same error.
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = err.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        let message = fields
            .into_iter()
            .find_map(|(field, errors)| {
                errors.first().map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .unwrap_or_else(|| format!("Validation error: {}", err));
        AppError::InvalidInput(message)
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Storage(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Unauthenticated(_) => (
            401,
            "UNAUTHENTICATED",
            false,
            Some("Sign in again and retry"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::SubscriptionRequired(_) => (
            403,
            "PREMIUM_REQUIRED",
            false,
            Some("Upgrade to the premium plan to use this feature"),
            false,
            LogLevel::Debug,
        ),
        AppError::UsageLimitExceeded { .. } => (
            402,
            "LIMIT_REACHED",
            false,
            Some("Upgrade to continue"),
            false,
            LogLevel::Warn,
        ),
        AppError::ExternalService { .. } => (
            502,
            "EXTERNAL_SERVICE_ERROR",
            true,
            Some("Retry after a short delay"),
            false,
            LogLevel::Warn,
        ),
        AppError::ExternalServiceTimeout { .. } => (
            504,
            "EXTERNAL_SERVICE_TIMEOUT",
            true,
            Some("Retry after a short delay"),
            false,
            LogLevel::Warn,
        ),
        AppError::CreationNotRecorded { .. } => (
            500,
            "CREATION_NOT_RECORDED",
            true,
            Some("Your usage was not charged; retry the request"),
            false,
            LogLevel::Error,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Storage(_) => "Storage",
            AppError::Unauthenticated(_) => "Unauthenticated",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::SubscriptionRequired(_) => "SubscriptionRequired",
            AppError::UsageLimitExceeded { .. } => "UsageLimitExceeded",
            AppError::ExternalService { .. } => "ExternalService",
            AppError::ExternalServiceTimeout { .. } => "ExternalServiceTimeout",
            AppError::CreationNotRecorded { .. } => "CreationNotRecorded",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Failure category used to keep validation, authorization and upstream
    /// failures distinct from one another.
    pub fn category(&self) -> FailureCategory {
        match self {
            AppError::Unauthenticated(_) => FailureCategory::Unauthenticated,
            AppError::InvalidInput(_) | AppError::PayloadTooLarge(_) => {
                FailureCategory::ValidationFailure
            }
            AppError::SubscriptionRequired(_) | AppError::UsageLimitExceeded { .. } => {
                FailureCategory::AuthorizationFailure
            }
            AppError::ExternalService { .. } | AppError::ExternalServiceTimeout { .. } => {
                FailureCategory::ExternalServiceFailure
            }
            AppError::Database(_) | AppError::Storage(_) | AppError::CreationNotRecorded { .. } => {
                FailureCategory::StorageFailure
            }
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                FailureCategory::Internal
            }
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Storage(_) => {
                "Failed to access storage".to_string()
            }
            AppError::Unauthenticated(ref msg) => msg.clone(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::SubscriptionRequired(ref msg) => format!("Premium required: {}", msg),
            AppError::UsageLimitExceeded { used, limit } if used < limit => format!(
                "Free usage limit reached: {}/{} used, the remaining slots are held by \
                 requests still in progress. Retry once they finish or upgrade",
                used, limit
            ),
            AppError::UsageLimitExceeded { used, limit } => format!(
                "Free usage limit reached ({}/{}). Upgrade to continue",
                used, limit
            ),
            AppError::ExternalService { service, .. } => {
                format!("{} request failed", service)
            }
            AppError::ExternalServiceTimeout { service, seconds } => {
                format!("{} did not respond within {}s", service, seconds)
            }
            AppError::CreationNotRecorded { kind, .. } => format!(
                "The {} was generated but could not be saved; no usage was charged",
                kind
            ),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}
