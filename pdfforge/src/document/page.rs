//! Per-page editing state for one source document.
//!
//! [`PageGrid`] is shared between the editor and concurrently running
//! thumbnail renders. Every update touches exactly one entry, located by page
//! index, under a lock that is never held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::document::DocumentId;
use crate::selection::PageSelection;
use crate::thumbnail::Thumbnail;

/// One page of a document in an editing context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    /// 1-based page number.
    pub page_number: u32,
    /// Preview image, filled in asynchronously.
    pub thumbnail: Option<Thumbnail>,
    /// Whether the page is part of the current selection.
    pub selected: bool,
}

/// Page entries of one document, updated by index.
///
/// Clones share the same entries.
#[derive(Debug, Clone)]
pub struct PageGrid {
    document: DocumentId,
    entries: Arc<Mutex<Vec<PageEntry>>>,
}

impl PageGrid {
    /// One unselected entry without thumbnail per page.
    pub fn new(document: DocumentId, page_count: usize) -> Self {
        let entries = (1..=page_count as u32)
            .map(|page_number| PageEntry {
                page_number,
                thumbnail: None,
                selected: false,
            })
            .collect();

        Self {
            document,
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    /// The document these pages belong to.
    pub fn document(&self) -> DocumentId {
        self.document
    }

    /// Number of pages.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True for a zero-page document.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Store a rendered thumbnail for one page.
    ///
    /// Returns `false` and changes nothing if the render was started for a
    /// different document (the grid was replaced meanwhile) or the page does
    /// not exist.
    pub fn set_thumbnail(&self, document: DocumentId, page_number: u32, thumbnail: Thumbnail) -> bool {
        if document != self.document {
            return false;
        }
        self.update(page_number, |entry| entry.thumbnail = Some(thumbnail))
    }

    /// Mark one page as selected or not.
    pub fn set_selected(&self, page_number: u32, selected: bool) -> bool {
        self.update(page_number, |entry| entry.selected = selected)
    }

    /// Make the `selected` flags mirror `selection`.
    pub fn sync_selection(&self, selection: &PageSelection) {
        for entry in self.lock().iter_mut() {
            entry.selected = selection.contains(entry.page_number);
        }
    }

    /// The thumbnail of one page, if rendered.
    pub fn thumbnail(&self, page_number: u32) -> Option<Thumbnail> {
        let index = index_of(page_number)?;
        self.lock().get(index).and_then(|e| e.thumbnail.clone())
    }

    /// Copy of all entries.
    pub fn snapshot(&self) -> Vec<PageEntry> {
        self.lock().clone()
    }

    fn update(&self, page_number: u32, apply: impl FnOnce(&mut PageEntry)) -> bool {
        let Some(index) = index_of(page_number) else {
            return false;
        };
        match self.lock().get_mut(index) {
            Some(entry) => {
                apply(entry);
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PageEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn index_of(page_number: u32) -> Option<usize> {
    page_number.checked_sub(1).map(|i| i as usize)
}
