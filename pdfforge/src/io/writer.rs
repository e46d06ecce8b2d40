//! Serializing produced documents and writing download artifacts.
//!
//! This module provides:
//! - Serialization of a built document to bytes, off the async runtime
//! - Atomic artifact writes (write to temp file, then rename)
//! - Write statistics
//!
//! # Examples
//!
//! ```no_run
//! use pdfforge::io::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # async fn example(doc: Document) -> pdfforge::Result<()> {
//! let writer = PdfWriter::new();
//! let bytes = writer.to_bytes(doc).await?;
//! writer.save_bytes(bytes.into(), Path::new("output.pdf")).await?;
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::{fs, task};
use tracing::{debug, warn};

use crate::error::{PdfForgeError, Result};

/// How artifacts are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Stage into `<name>.tmp` and rename into place.
    pub atomic: bool,
    /// Renumber objects densely before serializing.
    pub renumber: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            renumber: true,
        }
    }
}

/// A written download artifact.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time spent writing.
    pub write_time: Duration,
    /// Bytes on disk.
    pub file_size: u64,
    /// Final location.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Size for display, e.g. `"1.50 KB"`.
    pub fn format_file_size(&self) -> String {
        crate::output::format_file_size(self.file_size)
    }
}

/// Turns built documents into bytes and bytes into files.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Atomic writes, renumbered output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer with explicit options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Serialize `doc` on the blocking pool.
    pub async fn to_bytes(&self, mut doc: Document) -> Result<Vec<u8>> {
        let renumber = self.options.renumber;

        task::spawn_blocking(move || {
            if renumber {
                doc.renumber_objects();
            }
            let mut bytes = Vec::new();
            doc.save_to(&mut bytes)
                .map_err(|e| PdfForgeError::other(format!("Failed to serialize PDF: {e}")))?;
            Ok::<_, PdfForgeError>(bytes)
        })
        .await
        .map_err(|e| PdfForgeError::other(format!("Serialize task failed: {e}")))?
    }

    /// Write `bytes` to `path`, replacing any file already there.
    ///
    /// An atomic write never leaves a truncated file at `path`: the staging
    /// file is removed again if anything fails.
    pub async fn save_bytes(&self, bytes: Arc<[u8]>, path: &Path) -> Result<WriteStatistics> {
        let start = Instant::now();

        if self.options.atomic {
            let staging = staging_path(path);
            let staged = async {
                fs::write(&staging, &bytes).await?;
                fs::rename(&staging, path).await
            }
            .await;
            if let Err(e) = staged {
                if let Err(cleanup) = fs::remove_file(&staging).await {
                    warn!(path = %staging.display(), error = %cleanup, "staging file left behind");
                }
                return Err(e.into());
            }
        } else {
            fs::write(path, &bytes).await?;
        }

        let stats = WriteStatistics {
            write_time: start.elapsed(),
            file_size: bytes.len() as u64,
            output_path: path.to_path_buf(),
        };
        debug!(path = %stats.output_path.display(), size = stats.file_size, "wrote artifact");
        Ok(stats)
    }

    /// Check that `dir` is an existing, writable directory.
    ///
    /// # Errors
    ///
    /// Returns [`PdfForgeError::InvalidConfig`] otherwise.
    pub async fn can_write(&self, dir: &Path) -> Result<()> {
        let reject = |what: &str| {
            PdfForgeError::invalid_config(format!("Output directory {what}: {}", dir.display()))
        };

        let metadata = fs::metadata(dir).await.map_err(|_| reject("does not exist"))?;
        if !metadata.is_dir() {
            return Err(reject("is not a directory"));
        }
        if metadata.permissions().readonly() {
            return Err(reject("is not writable"));
        }
        Ok(())
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;
    use tempfile::TempDir;

    fn one_page() -> Document {
        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            dictionary! { "Type" => "Pages", "Kids" => vec![page_id.into()], "Count" => 1 }.into(),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    #[tokio::test]
    async fn test_to_bytes_is_parseable() {
        let writer = PdfWriter::new();
        let bytes = writer.to_bytes(one_page()).await.unwrap();

        assert!(bytes.starts_with(b"%PDF-1.4"));
        let reparsed = Document::load_mem(&bytes).unwrap();
        assert_eq!(reparsed.get_pages().len(), 1);
    }

    #[tokio::test]
    async fn test_save_bytes_atomic() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("output.pdf");

        let writer = PdfWriter::new();
        let bytes = writer.to_bytes(one_page()).await.unwrap();
        let stats = writer.save_bytes(bytes.clone().into(), &output_path).await.unwrap();

        assert_eq!(stats.output_path, output_path);
        assert_eq!(stats.file_size, bytes.len() as u64);
        assert_eq!(std::fs::read(&output_path).unwrap(), bytes);
        assert!(!temp_dir.path().join("output.pdf.tmp").exists());
    }

    #[tokio::test]
    async fn test_save_replaces_existing_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("split_a.pdf");
        std::fs::write(&output_path, b"old").unwrap();

        PdfWriter::new()
            .save_bytes(Arc::from(&b"%PDF-1.4 new"[..]), &output_path)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&output_path).unwrap(), b"%PDF-1.4 new");
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_fails() {
        let writer = PdfWriter::new();
        let result = writer
            .save_bytes(Arc::from(&b"%PDF"[..]), Path::new("/nonexistent/dir/out.pdf"))
            .await;
        assert!(matches!(result, Err(PdfForgeError::Io { .. })));
    }

    #[tokio::test]
    async fn test_can_write() {
        let temp_dir = TempDir::new().unwrap();
        let writer = PdfWriter::new();

        assert!(writer.can_write(temp_dir.path()).await.is_ok());
        assert!(writer.can_write(Path::new("/nonexistent")).await.is_err());

        let file = temp_dir.path().join("file.pdf");
        std::fs::write(&file, b"").unwrap();
        assert!(writer.can_write(&file).await.is_err());
    }

    #[tokio::test]
    async fn test_direct_write_without_renumbering() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("output.pdf");

        let writer = PdfWriter::with_options(WriteOptions {
            atomic: false,
            renumber: false,
        });
        let bytes = writer.to_bytes(one_page()).await.unwrap();
        let stats = writer.save_bytes(bytes.into(), &output_path).await.unwrap();
        assert!(stats.file_size > 0);
        assert_eq!(std::fs::metadata(&output_path).unwrap().len(), stats.file_size);
    }
}
