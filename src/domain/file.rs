use std::fmt;
use std::fs;
use std::path::Path;

use crate::errors::{EventDeskError, Result};

/// A binary attachment carried by a form field (event photo, guest photo,
/// supporting document, logo).
#[derive(Clone, PartialEq, Eq)]
pub struct FileRef {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileRef {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Reads a file from disk, deriving the content type from its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                EventDeskError::InvalidInput(format!("`{}` is not a file path", path.display()))
            })?
            .to_string();
        let bytes = fs::read(path)?;
        Ok(Self::new(file_name, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileRef")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(FileRef::new("Logo.PNG", vec![1]).content_type, "image/png");
        assert_eq!(FileRef::new("permit.pdf", vec![]).content_type, "application/pdf");
        assert_eq!(
            FileRef::new("blob", vec![]).content_type,
            "application/octet-stream"
        );
    }

    #[test]
    fn debug_output_omits_bytes() {
        let file = FileRef::new("photo.jpg", vec![0; 2048]);
        let rendered = format!("{:?}", file);
        assert!(rendered.contains("len: 2048"));
        assert!(!rendered.contains("0, 0, 0"));
    }
}
