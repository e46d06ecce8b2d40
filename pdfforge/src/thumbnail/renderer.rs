//! Concurrent thumbnail rendering into a [`PageGrid`].

use futures::stream::{self, StreamExt};
use std::io::Cursor;
use std::sync::Arc;
use tokio::task;
use tracing::{debug, instrument, warn};

use crate::document::{ContentRef, PageGrid, SourceDocument};
use crate::error::{PdfForgeError, Result};
use crate::thumbnail::{PageRasterizer, RasterSource, Thumbnail};

/// Outcome of rendering a whole document's thumbnails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulateReport {
    /// Pages that got a thumbnail.
    pub rendered: usize,
    /// Pages left without one.
    pub failed: usize,
}

/// Renders page previews with bounded concurrency.
#[derive(Debug, Clone)]
pub struct ThumbnailRenderer {
    rasterizer: Arc<dyn PageRasterizer>,
    jobs: usize,
}

impl ThumbnailRenderer {
    /// Renderer using the best rasterizer compiled in.
    ///
    /// Without the `mupdf` feature that is [`GeometryRasterizer`], whose
    /// thumbnails are blank page-shaped placeholders with no page content.
    ///
    /// [`GeometryRasterizer`]: crate::thumbnail::GeometryRasterizer
    pub fn new(jobs: usize) -> Self {
        #[cfg(feature = "mupdf")]
        let rasterizer: Arc<dyn PageRasterizer> = Arc::new(crate::thumbnail::MupdfRasterizer);
        #[cfg(not(feature = "mupdf"))]
        let rasterizer: Arc<dyn PageRasterizer> = Arc::new(crate::thumbnail::GeometryRasterizer);

        Self::with_rasterizer(rasterizer, jobs)
    }

    /// Renderer with an explicit rasterizer.
    pub fn with_rasterizer(rasterizer: Arc<dyn PageRasterizer>, jobs: usize) -> Self {
        Self {
            rasterizer,
            jobs: jobs.max(1),
        }
    }

    /// Render one page, `target_width` pixels wide.
    ///
    /// The height follows the page's aspect ratio.
    pub async fn render(&self, content: &ContentRef, page_number: u32, target_width: u32) -> Result<Thumbnail> {
        let bytes = content.read().await?;
        let source = self.open(bytes).await?;
        draw(source, page_number, target_width).await
    }

    async fn open(&self, bytes: Arc<[u8]>) -> Result<Arc<dyn RasterSource>> {
        let rasterizer = Arc::clone(&self.rasterizer);
        task::spawn_blocking(move || rasterizer.open(bytes))
            .await
            .map_err(|e| PdfForgeError::other(format!("Thumbnail task failed: {e}")))?
    }

    /// Render every page of `source` into `grid`.
    ///
    /// The document is parsed once; its pages then render up to `jobs` at a
    /// time and complete in any order. Each completion is stored into its own
    /// entry as soon as it arrives. A page that fails is logged and left
    /// without a thumbnail; the others carry on.
    #[instrument(skip_all, fields(document = %source.id(), pages = source.page_count()))]
    pub async fn populate(&self, source: &SourceDocument, grid: &PageGrid, target_width: u32) -> PopulateReport {
        let mut report = PopulateReport::default();
        let document = source.id();
        let page_count = grid.len() as u32;

        let opened = async { self.open(source.content().read().await?).await }.await;
        let opened = match opened {
            Ok(opened) => opened,
            Err(e) => {
                warn!(error = %e, "cannot open source for thumbnails");
                report.failed = page_count as usize;
                return report;
            }
        };

        let mut completions = stream::iter(1..=page_count)
            .map(|page_number| {
                let opened = Arc::clone(&opened);
                async move { (page_number, draw(opened, page_number, target_width).await) }
            })
            .buffer_unordered(self.jobs);

        while let Some((page_number, result)) = completions.next().await {
            match result {
                Ok(thumbnail) => {
                    if grid.set_thumbnail(document, page_number, thumbnail) {
                        report.rendered += 1;
                    } else {
                        debug!(page_number, "grid no longer shows this document");
                        report.failed += 1;
                    }
                }
                Err(e) => {
                    warn!(page_number, error = %e, "thumbnail render failed");
                    report.failed += 1;
                }
            }
        }

        debug!(rendered = report.rendered, failed = report.failed, "thumbnails done");
        report
    }
}

/// Rasterize one page of an opened document and encode it as PNG.
async fn draw(source: Arc<dyn RasterSource>, page_number: u32, target_width: u32) -> Result<Thumbnail> {
    task::spawn_blocking(move || {
        let size = source.page_size(page_number)?;
        let scale = target_width as f32 / size.width.max(1.0);
        let raster = source.rasterize(page_number, scale)?;

        let mut png = Vec::new();
        raster.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;

        Ok::<_, PdfForgeError>(Thumbnail {
            page_number,
            width: raster.width(),
            height: raster.height(),
            png,
        })
    })
    .await
    .map_err(|e| PdfForgeError::other(format!("Thumbnail task failed: {e}")))?
}
