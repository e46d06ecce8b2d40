//! The document transform engine.
//!
//! Both operations are pure over their inputs: sources are parsed from
//! immutable bytes, pages are copied into a brand-new document, and the result
//! is serialized to a new byte buffer. Nothing about a source changes.
//!
//! - [`TransformEngine::split`] copies a page subset of one source, in the
//!   order the selection carries.
//! - [`TransformEngine::merge`] concatenates all pages of several sources, in
//!   list order.
//!
//! Parsing, page copying and serialization all run on the blocking pool.
//! Dropping the returned future abandons the work; no partial output is ever
//! returned.
//!
//! # Examples
//!
//! ```no_run
//! use pdfforge::selection::PageSelection;
//! use pdfforge::transform::TransformEngine;
//! # use pdfforge::document::SourceDocument;
//!
//! # async fn example(source: SourceDocument) -> pdfforge::Result<()> {
//! let engine = TransformEngine::new();
//! let selection = PageSelection::in_click_order([3, 1, 2]);
//! let output = engine.split(&source, &selection).await?;
//! assert_eq!(output.page_count, 3);
//! # Ok(())
//! # }
//! ```

pub mod merge;
pub mod pages;
pub mod split;

use std::time::{Duration, Instant};
use tokio::task;
use tracing::{info, instrument};

use crate::document::SourceDocument;
use crate::error::{PdfForgeError, Result};
use crate::io::{PdfReader, PdfWriter};
use crate::selection::PageSelection;

pub use merge::MIN_MERGE_SOURCES;
pub use pages::PageTree;

/// Bytes produced by a transform.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// Serialized PDF.
    pub bytes: Vec<u8>,
    /// Number of pages in the output.
    pub page_count: usize,
    /// Wall time spent.
    pub elapsed: Duration,
}

/// Runs split and merge operations.
#[derive(Debug, Clone)]
pub struct TransformEngine {
    reader: PdfReader,
    writer: PdfWriter,
    load_workers: usize,
}

impl TransformEngine {
    /// Create an engine parsing up to four merge sources at once.
    pub fn new() -> Self {
        Self::with_workers(4)
    }

    /// Create an engine with a given number of concurrent source parses.
    pub fn with_workers(load_workers: usize) -> Self {
        Self {
            reader: PdfReader::new(),
            writer: PdfWriter::new(),
            load_workers: load_workers.max(1),
        }
    }

    /// Extract `selection` from `source` into a new document.
    ///
    /// # Errors
    ///
    /// - [`PdfForgeError::EmptySelection`] if nothing is selected
    /// - [`PdfForgeError::InvalidPage`] if a page is 0 or past the end
    /// - [`PdfForgeError::CorruptSource`] if the source does not parse
    #[instrument(skip_all, fields(source = %source.id(), pages = selection.len()))]
    pub async fn split(&self, source: &SourceDocument, selection: &PageSelection) -> Result<TransformOutput> {
        let start = Instant::now();
        split::check_pages(selection.pages(), source.page_count())?;

        let loaded = self.reader.load(source).await?;
        let pages = selection.pages().to_vec();
        let document = task::spawn_blocking(move || split::build(loaded, &pages))
            .await
            .map_err(|e| PdfForgeError::other(format!("Split task failed: {e}")))??;

        let page_count = selection.len();
        let bytes = self.writer.to_bytes(document).await?;
        let elapsed = start.elapsed();

        info!(page_count, size = bytes.len(), ms = elapsed.as_millis() as u64, "split complete");
        Ok(TransformOutput {
            bytes,
            page_count,
            elapsed,
        })
    }

    /// Concatenate all pages of `sources`, in order, into a new document.
    ///
    /// # Errors
    ///
    /// - [`PdfForgeError::InsufficientInput`] with fewer than two sources,
    ///   before anything is parsed
    /// - [`PdfForgeError::CorruptSource`] naming the first source, in list
    ///   order, that does not parse; the whole merge is abandoned
    #[instrument(skip_all, fields(sources = sources.len()))]
    pub async fn merge(&self, sources: &[SourceDocument]) -> Result<TransformOutput> {
        let start = Instant::now();
        merge::check_source_count(sources.len())?;

        let loaded = self.reader.load_all(sources, self.load_workers).await?;
        let page_count: usize = loaded.iter().map(|l| l.page_count).sum();

        let document = task::spawn_blocking(move || merge::build(loaded))
            .await
            .map_err(|e| PdfForgeError::other(format!("Merge task failed: {e}")))??;

        let bytes = self.writer.to_bytes(document).await?;
        let elapsed = start.elapsed();

        info!(page_count, size = bytes.len(), ms = elapsed.as_millis() as u64, "merge complete");
        Ok(TransformOutput {
            bytes,
            page_count,
            elapsed,
        })
    }
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self::new()
    }
}
