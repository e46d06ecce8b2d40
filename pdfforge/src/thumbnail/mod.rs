//! Thumbnail rendering.
//!
//! Rendering is independent of the transform engine: it reads the same
//! immutable source bytes and produces small PNG previews, one page at a time.
//!
//! By default thumbnails come from [`GeometryRasterizer`] and are blank
//! placeholders: white, bordered, and shaped like the page, but showing none
//! of its content. Build with the `mupdf` feature to render real page
//! content through `MupdfRasterizer`.

pub mod raster;
pub mod renderer;

pub use raster::{GeometryRasterizer, PageRasterizer, PageSize, RasterSource};
#[cfg(feature = "mupdf")]
pub use raster::MupdfRasterizer;
pub use renderer::{PopulateReport, ThumbnailRenderer};

/// A PNG-encoded page preview.
#[derive(Clone, PartialEq, Eq)]
pub struct Thumbnail {
    /// 1-based page this preview shows.
    pub page_number: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// PNG bytes.
    pub png: Vec<u8>,
}

impl std::fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Thumbnail")
            .field("page_number", &self.page_number)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("png_bytes", &self.png.len())
            .finish()
    }
}
