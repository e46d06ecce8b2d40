//! Ordered list of documents waiting to be merged.

use chrono::Utc;

use crate::document::{DocumentId, SourceDocument};
use crate::error::{PdfForgeError, Result};
use crate::output;
use crate::transform::MIN_MERGE_SOURCES;

/// Documents to concatenate, in output order, plus the output name.
#[derive(Debug, Clone)]
pub struct MergePlan {
    documents: Vec<SourceDocument>,
    output_name: String,
}

impl Default for MergePlan {
    fn default() -> Self {
        Self {
            documents: Vec::new(),
            output_name: output::merge_output_name(Utc::now()),
        }
    }
}

impl MergePlan {
    /// An empty plan named `merged_<millis>.pdf`, stamped now.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document at the end.
    ///
    /// The same document may appear more than once; each occurrence
    /// contributes all of its pages.
    pub fn add(&mut self, document: SourceDocument) {
        self.documents.push(document);
    }

    /// Remove the first occurrence of a document.
    pub fn remove(&mut self, id: DocumentId) -> Option<SourceDocument> {
        let index = self.documents.iter().position(|d| d.id() == id)?;
        Some(self.documents.remove(index))
    }

    /// Move the entry at `from` so that it ends up at index `to`.
    ///
    /// The other entries keep their relative order, as when an item is
    /// dragged to a new slot in a list.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.documents.len();
        if from >= len || to >= len {
            return Err(PdfForgeError::other(format!(
                "Cannot move entry {from} to {to} in a plan of {len}"
            )));
        }
        let document = self.documents.remove(from);
        self.documents.insert(to, document);
        Ok(())
    }

    /// Documents in concatenation order.
    pub fn documents(&self) -> &[SourceDocument] {
        &self.documents
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True if the plan has no entries.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Page count of the merged output.
    pub fn total_pages(&self) -> usize {
        self.documents.iter().map(SourceDocument::page_count).sum()
    }

    /// Set the download name; `.pdf` is appended when missing.
    pub fn set_output_name(&mut self, name: &str) -> Result<()> {
        self.output_name = output::normalize_output_name(name)?;
        Ok(())
    }

    /// Download name; fixed when the plan is created unless changed.
    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    /// Check that the plan has enough entries to merge.
    pub fn ensure_executable(&self) -> Result<()> {
        if self.documents.len() < MIN_MERGE_SOURCES {
            return Err(PdfForgeError::InsufficientInput {
                count: self.documents.len(),
            });
        }
        Ok(())
    }
}
