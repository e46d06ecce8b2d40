//! The session document registry.
//!
//! [`SessionModel`] owns every uploaded [`SourceDocument`] and every
//! [`ProcessedDocument`] produced in the session. Sources and processed
//! results have independent lifetimes: clearing one never touches the other.

use std::collections::{HashSet, VecDeque};
use tracing::debug;
use uuid::Uuid;

use crate::document::{DocumentId, ProcessedDocument, SourceDocument};
use crate::error::{PdfForgeError, Result};

/// In-memory registry of sources and results for one session.
#[derive(Debug, Default)]
pub struct SessionModel {
    documents: Vec<SourceDocument>,
    ids: HashSet<DocumentId>,
    active: Option<DocumentId>,
    processed: VecDeque<ProcessedDocument>,
}

impl SessionModel {
    /// An empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an uploaded document.
    ///
    /// # Errors
    ///
    /// Fails if a document with the same id is already registered. Two
    /// uploads of identical bytes have different ids and are both accepted.
    pub fn add_document(&mut self, document: SourceDocument) -> Result<()> {
        if !self.ids.insert(document.id()) {
            return Err(PdfForgeError::other(format!(
                "Document {} is already registered",
                document.id()
            )));
        }
        debug!(id = %document.id(), name = document.name(), "document added");
        self.documents.push(document);
        Ok(())
    }

    /// Unregister a document.
    ///
    /// If it was the active document, no document is active afterwards.
    pub fn remove_document(&mut self, id: DocumentId) -> Option<SourceDocument> {
        if !self.ids.remove(&id) {
            return None;
        }
        if self.active == Some(id) {
            self.active = None;
        }
        let index = self.documents.iter().position(|d| d.id() == id)?;
        Some(self.documents.remove(index))
    }

    /// Look up a registered document.
    pub fn document(&self, id: DocumentId) -> Option<&SourceDocument> {
        self.documents.iter().find(|d| d.id() == id)
    }

    /// All registered documents in upload order.
    pub fn documents(&self) -> &[SourceDocument] {
        &self.documents
    }

    /// Make a registered document the one being edited.
    pub fn set_active(&mut self, id: DocumentId) -> Result<()> {
        if !self.ids.contains(&id) {
            return Err(PdfForgeError::not_found("Document", id));
        }
        self.active = Some(id);
        Ok(())
    }

    /// The document being edited, if any.
    pub fn active(&self) -> Option<&SourceDocument> {
        self.active.and_then(|id| self.document(id))
    }

    /// Drop every source document and unset the active one.
    ///
    /// Processed results are kept.
    pub fn clear(&mut self) {
        self.documents.clear();
        self.ids.clear();
        self.active = None;
    }

    /// Record a result; it becomes the first entry of [`processed`].
    ///
    /// [`processed`]: SessionModel::processed
    pub fn record_processed(&mut self, document: ProcessedDocument) {
        debug!(id = %document.id, kind = %document.kind(), "processed document recorded");
        self.processed.push_front(document);
    }

    /// Results, most recent first.
    pub fn processed(&self) -> impl ExactSizeIterator<Item = &ProcessedDocument> {
        self.processed.iter()
    }

    /// Look up a result.
    pub fn processed_document(&self, id: Uuid) -> Option<&ProcessedDocument> {
        self.processed.iter().find(|p| p.id == id)
    }

    /// Forget a result. Remote copies are not touched.
    pub fn remove_processed(&mut self, id: Uuid) -> Option<ProcessedDocument> {
        let index = self.processed.iter().position(|p| p.id == id)?;
        self.processed.remove(index)
    }
}
