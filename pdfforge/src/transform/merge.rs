//! Concatenating whole sources into a new document.

use lopdf::Document;

use crate::error::{PdfForgeError, Result};
use crate::io::LoadedPdf;
use crate::transform::pages::PageTree;

/// Fewest sources a merge accepts.
pub const MIN_MERGE_SOURCES: usize = 2;

/// Refuse merges with fewer than two sources.
pub(crate) fn check_source_count(count: usize) -> Result<()> {
    if count < MIN_MERGE_SOURCES {
        return Err(PdfForgeError::InsufficientInput { count });
    }
    Ok(())
}

/// Append every page of every source, sources in list order and pages in
/// each source's native order.
pub(crate) fn build(sources: Vec<LoadedPdf>) -> Result<Document> {
    check_source_count(sources.len())?;

    let version = sources
        .iter()
        .map(|loaded| loaded.document.version.as_str())
        .max()
        .unwrap_or("1.4")
        .to_string();

    let mut tree = PageTree::new(&version);
    for loaded in sources {
        let mut source = loaded.document;
        tree.adopt(&mut source);
        for page_id in source.get_pages().into_values() {
            tree.push_page(&source, page_id)?;
        }
    }

    Ok(tree.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_source_count() {
        assert!(matches!(
            check_source_count(0),
            Err(PdfForgeError::InsufficientInput { count: 0 })
        ));
        assert!(matches!(
            check_source_count(1),
            Err(PdfForgeError::InsufficientInput { count: 1 })
        ));
        assert!(check_source_count(2).is_ok());
    }

    #[test]
    fn test_build_refuses_single_source() {
        let loaded = LoadedPdf {
            document: Document::with_version("1.5"),
            name: "only.pdf".into(),
            page_count: 0,
            load_time: std::time::Duration::ZERO,
            byte_size: 0,
        };
        assert!(build(vec![loaded]).is_err());
    }
}
