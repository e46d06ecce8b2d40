//! Building a fresh document out of pages copied from parsed sources.
//!
//! The output always gets a new catalog and a flat page tree. Attributes a
//! page inherited from its old ancestors are copied onto the page itself, so
//! it renders the same under its new parent.

use lopdf::{Document, Object, ObjectId, dictionary};
use tracing::trace;

use crate::error::{PdfForgeError, Result};
use crate::utils::{INHERITABLE_PAGE_KEYS, copy_references, detach_page, inherited_attribute};

/// A document under construction.
#[derive(Debug)]
pub struct PageTree {
    document: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
}

impl PageTree {
    /// Start an empty document with the given header version.
    pub fn new(version: &str) -> Self {
        let mut document = Document::with_version(version);
        let pages_id = document.new_object_id();

        Self {
            document,
            pages_id,
            kids: Vec::new(),
        }
    }

    /// Renumber `source` so none of its object ids collide with ids already
    /// used by this tree, and reserve its ids. Call once per source, before
    /// copying its pages.
    pub fn adopt(&mut self, source: &mut Document) {
        source.renumber_objects_with(self.document.max_id + 1);
        let source_max = source.objects.keys().map(|&(id, _)| id).max().unwrap_or(0);
        self.document.max_id = self.document.max_id.max(source_max);
    }

    /// Append one page of `source`, identified by its object id.
    ///
    /// `source` must have been passed through [`PageTree::adopt`].
    pub fn push_page(&mut self, source: &Document, page_id: ObjectId) -> Result<()> {
        let mut page = source
            .get_dictionary(page_id)
            .map_err(|e| PdfForgeError::other(format!("Page object {page_id:?} is unusable: {e}")))?
            .clone();

        for key in INHERITABLE_PAGE_KEYS {
            if !page.has(key)
                && let Some(value) = inherited_attribute(source, page_id, key)
            {
                page.set(key, value);
            }
        }
        detach_page(&mut page);

        for (_, value) in page.iter() {
            copy_references(&mut self.document, source, value);
        }

        page.set("Parent", self.pages_id);
        self.document.objects.insert(page_id, Object::Dictionary(page));
        self.kids.push(page_id.into());

        trace!(?page_id, total = self.kids.len(), "copied page");
        Ok(())
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Write the page tree root and catalog and return the document.
    pub fn finish(self) -> Document {
        let Self {
            mut document,
            pages_id,
            kids,
        } = self;

        let count = kids.len() as i64;
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        document
    }
}
