//! The upload boundary.
//!
//! An [`Upload`] is what a caller hands in before anything is parsed. It must
//! pass [`validate_upload`] before the reader ever sees it.

use std::path::Path;

use crate::document::ContentRef;
use crate::{PdfForgeError, Result};

/// The only accepted content type.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A file offered for upload.
#[derive(Debug, Clone)]
pub struct Upload {
    /// File name shown to the user.
    pub name: String,
    /// Declared MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub byte_size: u64,
    /// Where the bytes are.
    pub content: ContentRef,
}

impl Upload {
    /// Wrap in-memory bytes with a declared content type.
    pub fn from_bytes(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            byte_size: bytes.len() as u64,
            content: ContentRef::from_bytes(bytes),
        }
    }

    /// Describe a file on disk. The content type is declared from the
    /// extension, the way a browser would.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let metadata = tokio::fs::metadata(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            content_type: content_type_for(path).to_string(),
            byte_size: metadata.len(),
            content: ContentRef::from_path(path),
        })
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => PDF_CONTENT_TYPE,
        _ => "application/octet-stream",
    }
}

/// Check content type and size.
///
/// # Errors
///
/// Returns [`PdfForgeError::Validation`] if the declared type is not
/// `application/pdf` or the file is larger than `max_bytes`.
pub fn validate_upload(upload: &Upload, max_bytes: u64) -> Result<()> {
    if upload.content_type != PDF_CONTENT_TYPE {
        return Err(PdfForgeError::validation(
            &upload.name,
            format!("only PDF files are accepted (got {})", upload.content_type),
        ));
    }

    if upload.byte_size > max_bytes {
        return Err(PdfForgeError::validation(
            &upload.name,
            format!(
                "file is {} but the limit is {}",
                crate::output::format_file_size(upload.byte_size),
                crate::output::format_file_size(max_bytes)
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
    use rstest::rstest;

    #[rstest]
    #[case("application/pdf", 10, true)]
    #[case("image/png", 10, false)]
    #[case("application/pdf", DEFAULT_MAX_UPLOAD_BYTES, true)]
    #[case("application/pdf", DEFAULT_MAX_UPLOAD_BYTES + 1, false)]
    fn test_validate_upload(#[case] content_type: &str, #[case] size: u64, #[case] ok: bool) {
        let upload = Upload {
            name: "doc.pdf".into(),
            content_type: content_type.into(),
            byte_size: size,
            content: ContentRef::from_bytes(Vec::<u8>::new()),
        };
        let result = validate_upload(&upload, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(result.is_ok(), ok);
        if let Err(err) = result {
            assert!(matches!(err, PdfForgeError::Validation { .. }));
        }
    }

    #[tokio::test]
    async fn test_from_path_declares_type_from_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        let pdf = dir.path().join("Report.PDF");
        let txt = dir.path().join("notes.txt");
        std::fs::write(&pdf, b"%PDF").unwrap();
        std::fs::write(&txt, b"hi").unwrap();

        let upload = Upload::from_path(&pdf).await.unwrap();
        assert_eq!(upload.name, "Report.PDF");
        assert_eq!(upload.content_type, PDF_CONTENT_TYPE);
        assert_eq!(upload.byte_size, 4);

        let upload = Upload::from_path(&txt).await.unwrap();
        assert_eq!(upload.content_type, "application/octet-stream");
    }
}
