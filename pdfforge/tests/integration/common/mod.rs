//! Shared helpers for the integration tests.
//!
//! Fixtures are generated on the fly: page `i` of a generated document gets a
//! distinct MediaBox width, so the order of pages in an output can be read
//! back without rendering anything.

#![allow(dead_code)]

use lopdf::{Document, Object, Stream, dictionary};
use pdfforge::Config;
use pdfforge::document::Upload;
use pdfforge::guest::GuestQuota;
use pdfforge::history::HistoryStore;
use pdfforge::utils;
use pdfforge::workspace::Workspace;
use std::sync::Arc;
use tempfile::TempDir;

/// Build a PDF whose pages have the given widths, in points.
///
/// Every page also carries a small content stream naming its width.
pub fn pdf_with_widths(widths: &[i64]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let kids: Vec<Object> = widths
        .iter()
        .map(|&width| {
            let content = format!("BT /F1 12 Tf 10 10 Td (Page {width}) Tj ET");
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), width.into(), 400.into()],
                "Contents" => content_id,
            })
            .into()
        })
        .collect();
    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => widths.len() as i64,
        }
        .into(),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("Failed to serialize fixture");
    bytes
}

/// A document of `pages` pages, widths `base + 1 ..= base + pages`.
pub fn numbered_pdf(base: i64, pages: usize) -> Vec<u8> {
    let widths: Vec<i64> = (1..=pages as i64).map(|n| base + n).collect();
    pdf_with_widths(&widths)
}

/// Wrap generated bytes as a PDF upload.
pub fn pdf_upload(name: &str, bytes: Vec<u8>) -> Upload {
    Upload::from_bytes(name, "application/pdf", bytes)
}

/// Page widths of a serialized PDF, in page order.
pub fn page_widths(bytes: &[u8]) -> Vec<i64> {
    let doc = Document::load_mem(bytes).expect("Output is not a readable PDF");
    doc.get_pages()
        .values()
        .map(|&page_id| utils::page_dimensions(&doc, page_id).0.round() as i64)
        .collect()
}

/// A workspace writing into a fresh temporary directory.
pub fn workspace(store: Arc<dyn HistoryStore>, guest_limit: u32) -> (TempDir, Workspace) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = Config {
        output_dir: dir.path().to_path_buf(),
        guest_limit,
        ..Config::default()
    };
    let gate = Arc::new(GuestQuota::in_memory(guest_limit));
    (dir, Workspace::new(config, store, gate))
}
