//! Inkwell API Library
//!
//! HTTP surface of the generation gateway: session authentication, request
//! extraction, the generation pipeline, handlers and application setup.

mod api_doc;
pub mod constants;
mod handlers;
pub mod services;
pub mod setup;
mod telemetry;
pub mod utils;

// Public modules
pub mod auth;
pub mod error;
pub mod state;

// Re-exports
pub use error::ErrorResponse;
pub use handlers::GenerationResponse;
pub use services::{Capabilities, GenerationGateway, GenerationLimits};
