//! Multipart form reading for the upload endpoints

use axum::extract::Multipart;
use bytes::Bytes;
use inkwell_core::AppError;
use std::collections::HashMap;

const MAX_FILENAME_LENGTH: usize = 255;

/// A file part received in a multipart form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Content type without parameters, lowercased.
    pub fn mime_type(&self) -> String {
        normalize_mime_type(&self.content_type).to_lowercase()
    }
}

/// Files and text fields of a multipart form, keyed by field name
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub files: HashMap<String, UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl MultipartForm {
    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }

    pub fn take_field(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }
}

/// Read every part of a multipart form. Parts carrying a filename are files;
/// the rest are UTF-8 text fields. Repeated field names are rejected.
pub async fn read_multipart(mut multipart: Multipart) -> Result<MultipartForm, AppError> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();
        if form.files.contains_key(&name) || form.fields.contains_key(&name) {
            return Err(AppError::InvalidInput(format!(
                "Field '{}' was sent more than once",
                name
            )));
        }

        match field.file_name().map(sanitize_filename) {
            Some(filename) => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read file data: {}", e))
                })?;
                form.files.insert(
                    name,
                    UploadedFile {
                        filename,
                        content_type,
                        data,
                    },
                );
            }
            None => {
                let value = field.text().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read field '{}': {}", name, e))
                })?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// Keep only the final path component and replace anything unusual with `_`.
pub fn sanitize_filename(filename: &str) -> String {
    let filename_only = std::path::Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        "upload".to_string()
    } else {
        sanitized
    }
}
