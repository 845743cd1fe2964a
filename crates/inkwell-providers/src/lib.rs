//! External generation capabilities
//!
//! Each capability the gateway calls out to is a trait in [`traits`]; the
//! remaining modules are the HTTP and in-process implementations wired up in
//! production.

pub mod clipdrop;
pub mod cloudinary;
pub mod openai_compat;
pub mod pdf;
pub mod traits;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use clipdrop::{ClipDropClient, ClipDropImageGenerator};
pub use cloudinary::{CloudinaryClient, CloudinaryConfig};
pub use openai_compat::OpenAiCompatibleClient;
pub use pdf::PdfTextExtractor;
pub use traits::{
    Completion, CompletionRequest, CompletionUsage, DocumentExtractor, ImageEditor,
    ImageGenerator, ImageUpload, ProviderError, ProviderResult, TextGenerator,
};
