//! User-facing output: download names, sizes, and message formatting.
//!
//! # Examples
//!
//! ```
//! use pdfforge::output::{format_file_size, split_output_name};
//!
//! assert_eq!(format_file_size(1536), "1.50 KB");
//! assert_eq!(split_output_name("report.pdf"), "split_report.pdf");
//! ```

pub mod formatter;
pub mod naming;

pub use formatter::{MessageLevel, OutputFormatter};
pub use naming::{
    SPLIT_PREFIX, fallback_name, merge_output_name, normalize_output_name, split_output_name,
};

use crate::history::HistoryRecord;

/// Format a byte count as a human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match size {
        s if s >= GB => format!("{:.2} GB", s as f64 / GB as f64),
        s if s >= MB => format!("{:.2} MB", s as f64 / MB as f64),
        s if s >= KB => format!("{:.2} KB", s as f64 / KB as f64),
        s => format!("{s} bytes"),
    }
}

/// One-line summary of a history entry for listings.
pub fn describe_record(record: &HistoryRecord) -> String {
    let data = &record.operation_data;
    let detail = match (&data.pages, &data.file_ids) {
        (Some(pages), _) => format!(
            "pages {}",
            pages.iter().map(u32::to_string).collect::<Vec<_>>().join(",")
        ),
        (None, Some(ids)) => format!("{} sources", ids.len()),
        (None, None) => "no detail".to_string(),
    };

    format!(
        "{} {} -> {} ({} pages, {}) {}",
        record.file_type,
        record.original_name,
        record.download_name(),
        record.page_count,
        detail,
        record.created_at.format("%Y-%m-%d %H:%M"),
    )
}
