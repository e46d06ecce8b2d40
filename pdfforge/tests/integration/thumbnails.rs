//! Thumbnail rendering against generated documents.

use image::{Rgb, RgbImage};
use pdfforge::document::{ContentRef, PageGrid, SourceDocument};
use pdfforge::history::MemoryHistoryStore;
use pdfforge::thumbnail::{PageRasterizer, PageSize, PopulateReport, RasterSource, ThumbnailRenderer};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::common::{numbered_pdf, pdf_upload, workspace};

/// Records how many pages are being drawn at the same time.
#[derive(Debug, Default)]
struct CountingRasterizer {
    opens: AtomicUsize,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

struct CountingSource {
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl PageRasterizer for CountingRasterizer {
    fn open(&self, _pdf: Arc<[u8]>) -> pdfforge::Result<Arc<dyn RasterSource>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(CountingSource {
            in_flight: Arc::clone(&self.in_flight),
            peak: Arc::clone(&self.peak),
        }))
    }
}

impl RasterSource for CountingSource {
    fn page_size(&self, _page_number: u32) -> pdfforge::Result<PageSize> {
        Ok(PageSize {
            width: 100.0,
            height: 200.0,
        })
    }

    fn rasterize(&self, page_number: u32, scale: f32) -> pdfforge::Result<RgbImage> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(20));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let (w, h) = self.page_size(page_number)?.scaled(scale);
        Ok(RgbImage::from_pixel(w, h, Rgb([255, 255, 255])))
    }
}

#[tokio::test]
async fn test_rendering_never_exceeds_the_job_limit() {
    let rasterizer = Arc::new(CountingRasterizer::default());
    let renderer = ThumbnailRenderer::with_rasterizer(rasterizer.clone(), 2);
    let doc = SourceDocument::new("doc.pdf", 1, 6, ContentRef::from_bytes(vec![0u8]));
    let grid = PageGrid::new(doc.id(), 6);

    let report = renderer.populate(&doc, &grid, 40).await;

    assert_eq!(report, PopulateReport { rendered: 6, failed: 0 });
    let peak = rasterizer.peak.load(Ordering::SeqCst);
    assert!((1..=2).contains(&peak), "peak concurrency was {peak}");
    assert_eq!(rasterizer.opens.load(Ordering::SeqCst), 1);
    assert!(grid.snapshot().iter().all(|e| e.thumbnail.is_some()));
}

#[tokio::test]
async fn test_editor_grid_gets_page_shaped_previews() {
    let (_dir, mut ws) = workspace(Arc::new(MemoryHistoryStore::new()), 3);
    let doc = ws.upload(pdf_upload("tall.pdf", numbered_pdf(100, 3))).await.unwrap();
    let editor = ws.open_editor(doc.id()).unwrap();

    let report = ws.render_thumbnails(&editor).await;
    assert_eq!(report.rendered, 3);

    let width = ws.config().thumbnail_width;
    for entry in editor.grid().snapshot() {
        let thumbnail = entry.thumbnail.expect("page rendered");
        assert_eq!(thumbnail.page_number, entry.page_number);
        assert_eq!(thumbnail.width, width);
        // Pages are about four times taller than wide.
        assert!(thumbnail.height > 3 * thumbnail.width);
        assert!(thumbnail.png.starts_with(&[0x89, b'P', b'N', b'G']));
    }
}
