//! Page rasterization backends.
//!
//! [`GeometryRasterizer`] needs nothing beyond lopdf, but it draws no page
//! content: every thumbnail is a blank, correctly proportioned placeholder.
//! Enable the `mupdf` feature to get [`MupdfRasterizer`], which renders
//! what is actually on the page.
//!
//! A rasterizer first [opens](PageRasterizer::open) the document bytes
//! once; the returned [`RasterSource`] then draws any number of its pages
//! without parsing again.

use image::{Rgb, RgbImage};
use lopdf::Document;
use std::fmt;
use std::sync::Arc;

use crate::error::{PdfForgeError, Result};
use crate::utils;

/// Largest raster edge, in pixels.
pub const MAX_RASTER_EDGE: u32 = 4096;

/// Page size in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    /// Width in points.
    pub width: f32,
    /// Height in points.
    pub height: f32,
}

impl PageSize {
    /// Pixel dimensions at `scale`, at least 1x1 and at most
    /// [`MAX_RASTER_EDGE`] on each side.
    pub fn scaled(&self, scale: f32) -> (u32, u32) {
        let edge = |points: f32| ((points * scale).round() as u32).clamp(1, MAX_RASTER_EDGE);
        (edge(self.width), edge(self.height))
    }
}

/// Turns the pages of a PDF into pixels.
pub trait PageRasterizer: Send + Sync + fmt::Debug {
    /// Parse `pdf` for drawing. Called once per document, on the blocking
    /// pool.
    fn open(&self, pdf: Arc<[u8]>) -> Result<Arc<dyn RasterSource>>;
}

/// An opened document.
///
/// Shared by the blocking tasks that draw its pages, possibly several at
/// once.
pub trait RasterSource: Send + Sync {
    /// Native size of a 1-based page.
    fn page_size(&self, page_number: u32) -> Result<PageSize>;

    /// Render a 1-based page at `scale` pixels per point.
    fn rasterize(&self, page_number: u32, scale: f32) -> Result<RgbImage>;
}

/// Paints a page-shaped placeholder from the page geometry.
///
/// The result is white paper with a grey one-pixel border; nothing drawn on
/// the page shows up.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryRasterizer;

/// Page sizes read once from the page tree.
#[derive(Debug)]
struct PageGeometry {
    sizes: Vec<PageSize>,
}

impl PageRasterizer for GeometryRasterizer {
    fn open(&self, pdf: Arc<[u8]>) -> Result<Arc<dyn RasterSource>> {
        let doc =
            Document::load_mem(&pdf).map_err(|e| PdfForgeError::corrupt_source("thumbnail source", e.to_string()))?;
        // get_pages is keyed and ordered by page number.
        let sizes = doc
            .get_pages()
            .into_values()
            .map(|page_id| {
                let (width, height) = utils::page_dimensions(&doc, page_id);
                PageSize { width, height }
            })
            .collect();
        Ok(Arc::new(PageGeometry { sizes }))
    }
}

impl RasterSource for PageGeometry {
    fn page_size(&self, page_number: u32) -> Result<PageSize> {
        page_number
            .checked_sub(1)
            .and_then(|index| self.sizes.get(index as usize))
            .copied()
            .ok_or_else(|| PdfForgeError::invalid_page(i64::from(page_number), self.sizes.len()))
    }

    fn rasterize(&self, page_number: u32, scale: f32) -> Result<RgbImage> {
        let (width, height) = self.page_size(page_number)?.scaled(scale);

        let paper = Rgb([255, 255, 255]);
        let edge = Rgb([200, 200, 200]);
        Ok(RgbImage::from_fn(width, height, |x, y| {
            if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
                edge
            } else {
                paper
            }
        }))
    }
}

/// Full page rendering through MuPDF.
#[cfg(feature = "mupdf")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MupdfRasterizer;

/// MuPDF handles are not `Send`, so each drawing task opens its own from
/// the shared bytes; the page count is checked once up front.
#[cfg(feature = "mupdf")]
struct MupdfSource {
    pdf: Arc<[u8]>,
    page_count: usize,
}

#[cfg(feature = "mupdf")]
fn load_mupdf(pdf: &[u8]) -> Result<mupdf::Document> {
    mupdf::Document::from_bytes(pdf, "application/pdf")
        .map_err(|e| PdfForgeError::corrupt_source("thumbnail source", e.to_string()))
}

#[cfg(feature = "mupdf")]
impl PageRasterizer for MupdfRasterizer {
    fn open(&self, pdf: Arc<[u8]>) -> Result<Arc<dyn RasterSource>> {
        let count = load_mupdf(&pdf)?
            .page_count()
            .map_err(|e| PdfForgeError::other(e.to_string()))?;
        Ok(Arc::new(MupdfSource {
            pdf,
            page_count: count.max(0) as usize,
        }))
    }
}

#[cfg(feature = "mupdf")]
impl MupdfSource {
    fn load_page(&self, page_number: u32) -> Result<mupdf::Page> {
        let index = page_number
            .checked_sub(1)
            .filter(|&i| (i as usize) < self.page_count)
            .ok_or_else(|| PdfForgeError::invalid_page(i64::from(page_number), self.page_count))?;
        load_mupdf(&self.pdf)?
            .load_page(index as i32)
            .map_err(|e| PdfForgeError::other(format!("Cannot load page {page_number}: {e}")))
    }
}

#[cfg(feature = "mupdf")]
impl RasterSource for MupdfSource {
    fn page_size(&self, page_number: u32) -> Result<PageSize> {
        let page = self.load_page(page_number)?;
        let bounds = page.bounds().map_err(|e| PdfForgeError::other(e.to_string()))?;
        Ok(PageSize {
            width: bounds.x1 - bounds.x0,
            height: bounds.y1 - bounds.y0,
        })
    }

    fn rasterize(&self, page_number: u32, scale: f32) -> Result<RgbImage> {
        let page = self.load_page(page_number)?;
        let matrix = mupdf::Matrix::new_scale(scale, scale);
        let rgb = mupdf::Colorspace::device_rgb();
        let pixmap = page
            .to_pixmap(&matrix, &rgb, false, false)
            .map_err(|e| PdfForgeError::other(format!("Render of page {page_number} failed: {e}")))?;

        let width = pixmap.width();
        let height = pixmap.height();
        let n = pixmap.n() as usize;
        let stride = pixmap.stride() as usize;
        let samples = pixmap.samples();
        if n < 3 || samples.len() < stride * height as usize {
            return Err(PdfForgeError::other("Unsupported pixmap layout"));
        }

        let mut out = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height as usize {
            let row = &samples[y * stride..y * stride + width as usize * n];
            for px in row.chunks_exact(n) {
                out.extend_from_slice(&px[..3]);
            }
        }
        RgbImage::from_raw(width, height, out).ok_or_else(|| PdfForgeError::other("Pixmap size mismatch"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn landscape_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 800.into(), 400.into()],
        });
        doc.objects.insert(
            pages_id,
            dictionary! { "Type" => "Pages", "Kids" => vec![page_id.into()], "Count" => 1 }.into(),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_scaled_is_clamped() {
        let size = PageSize { width: 612.0, height: 792.0 };
        assert_eq!(size.scaled(0.25), (153, 198));
        assert_eq!(size.scaled(0.0), (1, 1));
        assert_eq!(size.scaled(100.0), (MAX_RASTER_EDGE, MAX_RASTER_EDGE));
    }

    #[test]
    fn test_geometry_rasterizer_keeps_aspect_ratio() {
        let source = GeometryRasterizer.open(landscape_pdf().into()).unwrap();

        let size = source.page_size(1).unwrap();
        assert_eq!(size, PageSize { width: 800.0, height: 400.0 });

        let image = source.rasterize(1, 0.25).unwrap();
        assert_eq!(image.dimensions(), (200, 100));
        assert_eq!(image.get_pixel(0, 0), &Rgb([200, 200, 200]));
        assert_eq!(image.get_pixel(100, 50), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_geometry_thumbnail_is_blank_inside_the_border() {
        let source = GeometryRasterizer.open(landscape_pdf().into()).unwrap();
        let image = source.rasterize(1, 0.1).unwrap();
        let (width, height) = image.dimensions();

        for (x, y, pixel) in image.enumerate_pixels() {
            let border = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
            let expected = if border { Rgb([200, 200, 200]) } else { Rgb([255, 255, 255]) };
            assert_eq!(pixel, &expected, "pixel ({x}, {y})");
        }
    }

    #[test]
    fn test_geometry_rasterizer_unknown_page() {
        let source = GeometryRasterizer.open(landscape_pdf().into()).unwrap();
        for page in [0, 2] {
            let err = source.rasterize(page, 1.0).unwrap_err();
            assert!(matches!(err, PdfForgeError::InvalidPage { page_count: 1, .. }));
        }
    }

    #[test]
    fn test_geometry_rasterizer_rejects_garbage() {
        let err = GeometryRasterizer
            .open(Arc::from(&b"not a pdf"[..]))
            .err()
            .expect("garbage input must fail to open");
        assert!(matches!(err, PdfForgeError::CorruptSource { .. }));
    }
}
