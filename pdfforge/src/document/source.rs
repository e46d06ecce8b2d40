//! Uploaded source documents and their byte content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::Result;

/// Identity of an uploaded document, unique per upload.
///
/// Uploading the same bytes twice yields two distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Allocate a fresh id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where a document's bytes live.
///
/// Cloning never copies document bytes.
#[derive(Debug, Clone)]
pub enum ContentRef {
    /// Bytes held in memory.
    Memory(Arc<[u8]>),
    /// Bytes stored in a file, read on demand.
    File(PathBuf),
}

impl ContentRef {
    /// Reference bytes already in memory.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Memory(bytes.into())
    }

    /// Reference a file on disk.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Resolve to bytes.
    ///
    /// For files this reads into a transient buffer owned by the caller; it
    /// is released when the returned value is dropped, on every exit path.
    pub async fn read(&self) -> Result<Arc<[u8]>> {
        match self {
            Self::Memory(bytes) => Ok(Arc::clone(bytes)),
            Self::File(path) => {
                let bytes = tokio::fs::read(path).await?;
                Ok(bytes.into())
            }
        }
    }

    /// The backing path, if file-based.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Memory(_) => None,
            Self::File(path) => Some(path),
        }
    }
}

/// An uploaded, parsed PDF.
///
/// The page count is resolved once at upload time and never revised.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    id: DocumentId,
    name: String,
    byte_size: u64,
    page_count: usize,
    uploaded_at: DateTime<Utc>,
    content: ContentRef,
}

impl SourceDocument {
    /// Create a document record with a fresh id, stamped now.
    pub fn new(
        name: impl Into<String>,
        byte_size: u64,
        page_count: usize,
        content: ContentRef,
    ) -> Self {
        Self {
            id: DocumentId::new(),
            name: name.into(),
            byte_size,
            page_count,
            uploaded_at: Utc::now(),
            content,
        }
    }

    /// Unique id of this upload.
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// File name as uploaded.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes.
    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// When the upload was accepted.
    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }

    /// Reference to the bytes.
    pub fn content(&self) -> &ContentRef {
        &self.content
    }
}
