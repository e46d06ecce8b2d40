//! Error types for pdfforge.
//!
//! Every fallible operation in the library returns [`PdfForgeError`]. The
//! variants follow the categories a caller has to tell apart when it turns a
//! failure into a user-facing message:
//!
//! - **Validation**: a rejected upload (wrong content type, too large). The
//!   operation never started.
//! - **Transform**: invalid page references, too few merge inputs, or a source
//!   that does not parse. The operation produced nothing.
//! - **Persistence**: the history store could not be reached. Local session
//!   state is still authoritative, so these are warnings.
//! - **Plumbing**: configuration, I/O and everything else.

use std::io;

/// Result type alias for pdfforge operations.
pub type Result<T> = std::result::Result<T, PdfForgeError>;

/// Main error type for pdfforge operations.
#[derive(Debug, thiserror::Error)]
pub enum PdfForgeError {
    /// An uploaded file was rejected before reaching the transform engine.
    #[error("Rejected upload '{name}': {reason}")]
    Validation {
        /// Name of the uploaded file.
        name: String,
        /// Why the file was rejected.
        reason: String,
    },

    /// A page selection references a page the source does not have.
    #[error(
        "Page {page} does not exist\n  Document has {page_count} page(s). Page numbers must be between 1 and {page_count}"
    )]
    InvalidPage {
        /// Offending 1-based page number.
        page: i64,
        /// Number of pages in the source document.
        page_count: usize,
    },

    /// A split was requested with nothing selected.
    #[error("No pages selected")]
    EmptySelection,

    /// A merge was requested with fewer than two sources.
    #[error("Merging needs at least 2 documents, got {count}")]
    InsufficientInput {
        /// Number of sources supplied.
        count: usize,
    },

    /// A source document could not be parsed.
    #[error("Corrupted or invalid PDF: {name}\n  Details: {reason}")]
    CorruptSource {
        /// Display name of the source.
        name: String,
        /// Parser message.
        reason: String,
    },

    /// The history store rejected or failed a request.
    #[error("History store unavailable: {reason}")]
    Persistence {
        /// Details about the failure.
        reason: String,
    },

    /// Anonymous usage quota is exhausted.
    #[error("Guest limit of {limit} operation(s) reached\n  Hint: sign in to keep working")]
    GuestLimitReached {
        /// Configured number of anonymous operations.
        limit: u32,
    },

    /// A referenced document or record does not exist.
    #[error("{what} not found: {id}")]
    NotFound {
        /// Kind of entity that was looked up.
        what: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for PdfForgeError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl From<reqwest::Error> for PdfForgeError {
    fn from(err: reqwest::Error) -> Self {
        Self::persistence(err.to_string())
    }
}

impl From<image::ImageError> for PdfForgeError {
    fn from(err: image::ImageError) -> Self {
        Self::other(format!("Image encoding failed: {err}"))
    }
}

impl PdfForgeError {
    /// Create a Validation error.
    pub fn validation(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidPage error.
    pub fn invalid_page(page: i64, page_count: usize) -> Self {
        Self::InvalidPage { page, page_count }
    }

    /// Create a CorruptSource error.
    pub fn corrupt_source(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CorruptSource {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a Persistence error.
    pub fn persistence(reason: impl Into<String>) -> Self {
        Self::Persistence {
            reason: reason.into(),
        }
    }

    /// Create a NotFound error.
    pub fn not_found(what: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            what,
            id: id.to_string(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error is only a warning.
    ///
    /// Persistence failures never invalidate local session state.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }

    /// Check if the failed operation produced no output at all.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::InvalidPage { .. }
                | Self::EmptySelection
                | Self::InsufficientInput { .. }
                | Self::CorruptSource { .. }
                | Self::GuestLimitReached { .. }
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } => 2,
            Self::InvalidPage { .. } => 1,
            Self::EmptySelection => 1,
            Self::InsufficientInput { .. } => 1,
            Self::CorruptSource { .. } => 3,
            Self::Persistence { .. } => 7,
            Self::GuestLimitReached { .. } => 8,
            Self::NotFound { .. } => 2,
            Self::InvalidConfig { .. } => 1,
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
