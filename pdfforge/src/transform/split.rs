//! Extracting a page subset of one source into a new document.

use lopdf::Document;

use crate::error::{PdfForgeError, Result};
use crate::io::LoadedPdf;
use crate::transform::pages::PageTree;

/// Check every page against the source's page count.
pub(crate) fn check_pages(pages: &[u32], page_count: usize) -> Result<()> {
    if pages.is_empty() {
        return Err(PdfForgeError::EmptySelection);
    }
    match pages
        .iter()
        .find(|&&page| page == 0 || page as usize > page_count)
    {
        Some(&page) => Err(PdfForgeError::invalid_page(i64::from(page), page_count)),
        None => Ok(()),
    }
}

/// Copy `pages` of `loaded`, in exactly the given order, into a new document.
pub(crate) fn build(loaded: LoadedPdf, pages: &[u32]) -> Result<Document> {
    let LoadedPdf {
        document: mut source,
        page_count,
        ..
    } = loaded;
    check_pages(pages, page_count)?;

    let mut tree = PageTree::new(&source.version);
    tree.adopt(&mut source);

    let page_ids = source.get_pages();
    for page in pages {
        let page_id = *page_ids
            .get(page)
            .ok_or_else(|| PdfForgeError::invalid_page(i64::from(*page), page_count))?;
        tree.push_page(&source, page_id)?;
    }

    Ok(tree.finish())
}
