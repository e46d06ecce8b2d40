//! Rows of the processing history table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::{OperationDetail, OperationKind, ProcessedDocument};
use crate::identity::OwnerId;
use crate::output;

/// The `operation_data` column: what was done, plus the download name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationData {
    /// Split pages in output order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<u32>>,
    /// Merge inputs in output order.
    #[serde(rename = "fileIds", default, skip_serializing_if = "Option::is_none")]
    pub file_ids: Option<Vec<String>>,
    /// Name the artifact was downloaded under.
    #[serde(rename = "fileName", default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl OperationData {
    /// Column value for `detail` downloaded as `file_name`.
    pub fn new(detail: &OperationDetail, file_name: impl Into<String>) -> Self {
        let mut data = Self {
            file_name: Some(file_name.into()),
            ..Self::default()
        };
        match detail {
            OperationDetail::Split { pages } => data.pages = Some(pages.clone()),
            OperationDetail::Merge { sources } => {
                data.file_ids = Some(sources.iter().map(ToString::to_string).collect());
            }
        }
        data
    }
}

/// What the workspace asks the store to persist.
#[derive(Debug, Clone)]
pub struct NewRecord {
    /// Record id; the same id the session uses for the result.
    pub id: Uuid,
    /// Owner of the record.
    pub owner: OwnerId,
    /// Input name(s).
    pub source_names: String,
    /// Where the result can be fetched.
    pub result_ref: String,
    /// Split or merge.
    pub kind: OperationKind,
    /// Pages in the result.
    pub page_count: usize,
    /// Parameters of the operation.
    pub detail: OperationDetail,
    /// Download name.
    pub file_name: String,
}

/// One stored history entry.
///
/// Field names match the table columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Record id.
    pub id: Uuid,
    /// Owner; guest results listed from the session have none.
    #[serde(default)]
    pub user_id: Option<OwnerId>,
    /// Input name(s).
    pub original_name: String,
    /// Where the result can be fetched.
    pub file_url: String,
    /// Split or merge.
    pub file_type: OperationKind,
    /// Pages in the result.
    pub page_count: usize,
    /// Operation parameters and download name.
    #[serde(default)]
    pub operation_data: OperationData,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
    /// Build the stored form of a new record, stamped with `created_at`.
    pub fn from_new(record: NewRecord, created_at: DateTime<Utc>) -> Self {
        let operation_data = OperationData::new(&record.detail, record.file_name);
        Self {
            id: record.id,
            user_id: Some(record.owner),
            original_name: record.source_names,
            file_url: record.result_ref,
            file_type: record.kind,
            page_count: record.page_count,
            operation_data,
            created_at,
        }
    }

    /// Describe a session result the same way as a stored one.
    pub fn from_processed(document: &ProcessedDocument) -> Self {
        let file_url = match document.result.path() {
            Some(path) => path.display().to_string(),
            None => format!("memory:{}", document.id),
        };
        Self {
            id: document.id,
            user_id: document.owner_id().cloned(),
            original_name: document.source_description.clone(),
            file_url,
            file_type: document.kind(),
            page_count: document.result_page_count,
            operation_data: OperationData::new(&document.detail, document.file_name.clone()),
            created_at: document.created_at,
        }
    }

    /// The stored download name, or `<kind>_<millis>.pdf` if none was kept.
    pub fn download_name(&self) -> String {
        match &self.operation_data.file_name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => output::fallback_name(self.file_type, Utc::now()),
        }
    }
}
