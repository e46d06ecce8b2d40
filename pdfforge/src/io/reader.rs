//! Loading and parsing source documents.
//!
//! This module turns a [`SourceDocument`]'s bytes into a parsed lopdf
//! [`Document`]:
//! - Parsing runs on the blocking pool so the async runtime stays responsive
//! - Byte buffers are scoped to the load call and dropped on every exit path
//! - Several sources load concurrently but are handed back in input order
//!
//! # Examples
//!
//! ```no_run
//! use pdfforge::io::PdfReader;
//! use pdfforge::document::{ContentRef, SourceDocument};
//!
//! # async fn example(source: SourceDocument) -> pdfforge::Result<()> {
//! let reader = PdfReader::new();
//! let loaded = reader.load(&source).await?;
//! println!("{} has {} pages", loaded.name, loaded.page_count);
//! # Ok(())
//! # }
//! ```

use futures::stream::{self, StreamExt, TryStreamExt};
use lopdf::Document;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;
use tracing::{debug, instrument};

use crate::document::SourceDocument;
use crate::error::{PdfForgeError, Result};
use crate::utils;

/// A parsed source document.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The parsed document.
    pub document: Document,

    /// Display name of the source.
    pub name: String,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Time taken to parse the document.
    pub load_time: Duration,

    /// Size of the parsed bytes.
    pub byte_size: u64,
}

/// Summary of a document, for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentInfo {
    /// Number of pages.
    pub page_count: usize,
    /// PDF header version, e.g. `"1.7"`.
    pub version: String,
    /// Size of the first page in points, rotation applied.
    pub first_page_size: Option<(f32, f32)>,
    /// Number of indirect objects.
    pub object_count: usize,
    /// Size in bytes.
    pub byte_size: u64,
}

/// PDF reader.
#[derive(Debug, Clone, Default)]
pub struct PdfReader;

impl PdfReader {
    /// Create a new PDF reader.
    pub fn new() -> Self {
        Self
    }

    /// Parse bytes as a PDF.
    ///
    /// # Errors
    ///
    /// Returns [`PdfForgeError::CorruptSource`] if the bytes are not a
    /// readable PDF, including encrypted documents that cannot be opened.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn parse(&self, name: &str, bytes: Arc<[u8]>) -> Result<LoadedPdf> {
        let owned_name = name.to_string();

        let loaded = task::spawn_blocking(move || {
            let start = Instant::now();
            let byte_size = bytes.len() as u64;

            let document = Document::load_mem(&bytes)
                .map_err(|e| corrupt_source_error(&owned_name, &e.to_string()))?;
            drop(bytes);

            let page_count = document.get_pages().len();
            Ok::<_, PdfForgeError>(LoadedPdf {
                document,
                name: owned_name,
                page_count,
                load_time: start.elapsed(),
                byte_size,
            })
        })
        .await
        .map_err(|e| PdfForgeError::corrupt_source(name, format!("parser stopped: {e}")))??;

        debug!(
            pages = loaded.page_count,
            ms = loaded.load_time.as_millis() as u64,
            "parsed source"
        );
        Ok(loaded)
    }

    /// Resolve a source's bytes and parse them.
    ///
    /// A source whose bytes cannot be read is reported as corrupt, naming it.
    pub async fn load(&self, source: &SourceDocument) -> Result<LoadedPdf> {
        let bytes = source
            .content()
            .read()
            .await
            .map_err(|e| PdfForgeError::corrupt_source(source.name(), format!("unreadable: {e}")))?;
        self.parse(source.name(), bytes).await
    }

    /// Load several sources with up to `workers` parses in flight.
    ///
    /// Results come back in input order. The first failure in input order
    /// aborts the whole batch; nothing partial is returned.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfforge::io::PdfReader;
    /// # use pdfforge::document::SourceDocument;
    /// # async fn example(sources: Vec<SourceDocument>) -> pdfforge::Result<()> {
    /// let reader = PdfReader::new();
    /// let loaded = reader.load_all(&sources, 4).await?;
    /// assert_eq!(loaded.len(), sources.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load_all(&self, sources: &[SourceDocument], workers: usize) -> Result<Vec<LoadedPdf>> {
        let workers = workers.max(1);

        stream::iter(sources.iter().map(|source| self.load(source)))
            .buffered(workers)
            .try_collect()
            .await
    }

    /// Parse bytes and summarize the document.
    pub async fn inspect(&self, name: &str, bytes: Arc<[u8]>) -> Result<DocumentInfo> {
        let byte_size = bytes.len() as u64;
        let loaded = self.parse(name, bytes).await?;
        let document = &loaded.document;

        let first_page_size = document
            .get_pages()
            .values()
            .next()
            .map(|&page_id| utils::page_dimensions(document, page_id));

        Ok(DocumentInfo {
            page_count: loaded.page_count,
            version: document.version.clone(),
            first_page_size,
            object_count: document.objects.len(),
            byte_size,
        })
    }
}

fn corrupt_source_error(name: &str, message: &str) -> PdfForgeError {
    let lower = message.to_lowercase();
    if lower.contains("encrypt") || lower.contains("password") || lower.contains("decrypt") {
        PdfForgeError::corrupt_source(name, "document is encrypted")
    } else {
        PdfForgeError::corrupt_source(name, message)
    }
}
