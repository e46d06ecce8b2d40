//! Download file names.

use chrono::{DateTime, Utc};

use crate::document::OperationKind;
use crate::error::{PdfForgeError, Result};

const PDF_EXTENSION: &str = ".pdf";

/// Prefix of the default split output name.
pub const SPLIT_PREFIX: &str = "split_";

fn has_pdf_extension(name: &str) -> bool {
    name.len() >= PDF_EXTENSION.len()
        && name.is_char_boundary(name.len() - PDF_EXTENSION.len())
        && name[name.len() - PDF_EXTENSION.len()..].eq_ignore_ascii_case(PDF_EXTENSION)
}

/// Trim `name` and make sure it ends in `.pdf`.
///
/// # Errors
///
/// Returns [`PdfForgeError::Validation`] for a blank name or one containing
/// a path separator.
pub fn normalize_output_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() || name.eq_ignore_ascii_case(PDF_EXTENSION) {
        return Err(PdfForgeError::validation(name, "output file name is empty"));
    }
    if name.contains(['/', '\\']) {
        return Err(PdfForgeError::validation(
            name,
            "output file name must not contain a path separator",
        ));
    }

    if has_pdf_extension(name) {
        Ok(name.to_string())
    } else {
        Ok(format!("{name}{PDF_EXTENSION}"))
    }
}

/// Default name for pages split out of `source_name`: `split_<source>.pdf`.
///
/// Only the last path component of `source_name` is used, so the result is
/// always a bare file name.
pub fn split_output_name(source_name: &str) -> String {
    let base = source_name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    let stem = match base {
        "" | "." | ".." => "document",
        other => other,
    };
    let stem = if has_pdf_extension(stem) {
        &stem[..stem.len() - PDF_EXTENSION.len()]
    } else {
        stem
    };
    format!("{SPLIT_PREFIX}{stem}{PDF_EXTENSION}")
}

/// Default merge output name, stamped with `now`.
pub fn merge_output_name(now: DateTime<Utc>) -> String {
    format!("merged_{}{PDF_EXTENSION}", now.timestamp_millis())
}

/// Name for a history entry that was stored without one.
pub fn fallback_name(kind: OperationKind, now: DateTime<Utc>) -> String {
    format!("{}_{}{PDF_EXTENSION}", kind.as_str(), now.timestamp_millis())
}
