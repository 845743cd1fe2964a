use async_trait::async_trait;
use bytes::Bytes;

use crate::traits::{DocumentExtractor, ProviderError, ProviderResult};

/// Extracts text from PDF documents on the blocking pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

fn extract(document: &[u8]) -> ProviderResult<String> {
    let text = pdf_extract::extract_text_from_mem(document)
        .map_err(|e| ProviderError::Extraction(e.to_string()))?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        tracing::warn!("PDF text extraction returned empty");
        return Err(ProviderError::EmptyOutput);
    }
    tracing::debug!(text_len = trimmed.len(), "PDF text extracted");
    Ok(trimmed.to_string())
}

#[async_trait]
impl DocumentExtractor for PdfTextExtractor {
    fn name(&self) -> &str {
        "document extractor"
    }

    async fn extract_text(&self, document: Bytes) -> ProviderResult<String> {
        tokio::task::spawn_blocking(move || extract(&document))
            .await
            .map_err(|e| ProviderError::Extraction(format!("extraction task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_garbage_input_is_extraction_error() {
        let err = PdfTextExtractor::new()
            .extract_text(Bytes::from_static(b"%PDF-1.4\nnot really a pdf"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Extraction(_) | ProviderError::EmptyOutput
        ));
    }
}
