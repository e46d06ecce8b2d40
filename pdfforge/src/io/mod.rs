//! Reading source documents and writing produced ones.

pub mod reader;
pub mod writer;

pub use reader::{DocumentInfo, LoadedPdf, PdfReader};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};
