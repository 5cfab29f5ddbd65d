//! Generic question attachments
//!
//! Unlike OCR images, attachments are capped by size and file type.

use std::path::Path;
use thiserror::Error;

/// A file attached to a question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name shown in the builder
    pub name: String,
    /// Size on disk
    pub size_bytes: u64,
}

/// Size and type limits for attachments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPolicy {
    pub max_bytes: u64,
    /// Lowercase extensions without the leading dot
    pub allowed_extensions: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttachmentError {
    #[error("{name} is {size_bytes} bytes, the limit is {max_bytes} bytes")]
    TooLarge {
        name: String,
        size_bytes: u64,
        max_bytes: u64,
    },
    #[error("{name}: unsupported file type (allowed: {allowed})")]
    UnsupportedType { name: String, allowed: String },
    #[error("cannot read {name}: {reason}")]
    Unreadable { name: String, reason: String },
}

impl AttachmentPolicy {
    /// Check a file name and size against the policy
    pub fn validate(&self, name: &str, size_bytes: u64) -> Result<Attachment, AttachmentError> {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        let allowed = extension
            .as_deref()
            .is_some_and(|ext| self.allowed_extensions.iter().any(|a| a == ext));
        if !allowed {
            return Err(AttachmentError::UnsupportedType {
                name: name.to_string(),
                allowed: self.allowed_extensions.join(", "),
            });
        }

        if size_bytes > self.max_bytes {
            return Err(AttachmentError::TooLarge {
                name: name.to_string(),
                size_bytes,
                max_bytes: self.max_bytes,
            });
        }

        Ok(Attachment {
            name: name.to_string(),
            size_bytes,
        })
    }

    /// Validate a file on disk by its metadata
    pub fn validate_path(&self, path: &Path) -> Result<Attachment, AttachmentError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let metadata = std::fs::metadata(path).map_err(|e| AttachmentError::Unreadable {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        self.validate(&name, metadata.len())
    }
}
