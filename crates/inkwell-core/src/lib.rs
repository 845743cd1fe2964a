//! Inkwell Core Library
//!
//! This crate provides the domain models, error taxonomy, quota rules and
//! configuration shared by every Inkwell component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod quota;

// Re-export commonly used types
pub use config::{BaseConfig, Config, GatewayConfig, SessionKeySource};
pub use error::{AppError, ErrorMetadata, FailureCategory, LogLevel};
pub use quota::{check_quota, DenyReason, PlanGate, QuotaDecision};
