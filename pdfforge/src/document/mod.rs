//! Document model: uploads, sources, page entries and processed results.

pub mod page;
pub mod processed;
pub mod source;
pub mod upload;

pub use page::{PageEntry, PageGrid};
pub use processed::{OperationDetail, OperationKind, ProcessedDocument};
pub use source::{ContentRef, DocumentId, SourceDocument};
pub use upload::{PDF_CONTENT_TYPE, Upload, validate_upload};
