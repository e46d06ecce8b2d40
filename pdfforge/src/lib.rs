//! pdfforge - Split and merge PDF documents page by page.
//!
//! This library provides the document model and transform engine behind a
//! split/merge workflow:
//!
//! - Page-range parsing and click-order page selection
//! - Splitting a page subset out of one document, in any order
//! - Merging several documents in a chosen order
//! - Concurrent thumbnail rendering
//! - A session model with processing history and a guest quota
//!
//! # Thumbnails
//!
//! Without optional features, thumbnails are blank page-shaped
//! placeholders: they have each page's proportions but none of its content.
//! Enable the `mupdf` feature for thumbnails that show the rendered page.
//!
//! # Examples
//!
//! ## Split through a workspace
//!
//! ```no_run
//! use pdfforge::Config;
//! use pdfforge::document::Upload;
//! use pdfforge::workspace::Workspace;
//! use std::path::Path;
//!
//! # async fn example() -> pdfforge::Result<()> {
//! let mut workspace = Workspace::from_config(Config::default()).await?;
//! let document = workspace.upload(Upload::from_path(Path::new("report.pdf")).await?).await?;
//!
//! let mut editor = workspace.open_editor(document.id())?;
//! editor.apply_range("1-3,7");
//! let outcome = workspace.split(&editor).await?;
//! println!("Wrote {}", outcome.artifact.output_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Using the engine directly
//!
//! ```no_run
//! use pdfforge::document::SourceDocument;
//! use pdfforge::transform::TransformEngine;
//!
//! # async fn example(a: SourceDocument, b: SourceDocument) -> pdfforge::Result<()> {
//! let engine = TransformEngine::new();
//! let output = engine.merge(&[a, b]).await?;
//! println!("Merged into {} pages", output.page_count);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod document;
pub mod error;
pub mod guest;
pub mod history;
pub mod identity;
pub mod io;
pub mod output;
pub mod selection;
pub mod session;
pub mod thumbnail;
pub mod transform;
pub mod utils;
pub mod workspace;

// Re-export commonly used types
pub use config::Config;
pub use error::{PdfForgeError, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
