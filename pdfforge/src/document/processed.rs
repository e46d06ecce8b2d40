//! Results of completed split and merge operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::PdfForgeError;
use crate::document::{ContentRef, DocumentId};
use crate::identity::{Identity, OwnerId};

/// Which transform produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Page subset of one source.
    Split,
    /// Concatenation of several sources.
    Merge,
}

impl OperationKind {
    /// Lowercase name, as stored in records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Split => "split",
            Self::Merge => "merge",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = PdfForgeError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "split" => Ok(Self::Split),
            "merge" => Ok(Self::Merge),
            other => Err(PdfForgeError::other(format!("Unknown operation kind: {other}"))),
        }
    }
}

/// What exactly a transform was asked to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OperationDetail {
    /// Pages taken from the source, in output order.
    Split {
        /// 1-based page numbers.
        pages: Vec<u32>,
    },
    /// Sources concatenated, in output order.
    Merge {
        /// Source document ids.
        #[serde(rename = "fileIds")]
        sources: Vec<DocumentId>,
    },
}

impl OperationDetail {
    /// The operation kind this detail describes.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Split { .. } => OperationKind::Split,
            Self::Merge { .. } => OperationKind::Merge,
        }
    }
}

/// A document produced by a transform in this session.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    /// Record id, shared with the remote copy if there is one.
    pub id: Uuid,
    /// Who ran the operation.
    pub owner: Identity,
    /// Name(s) of the inputs, comma separated.
    pub source_description: String,
    /// The produced bytes.
    pub result: ContentRef,
    /// Pages in the result.
    pub result_page_count: usize,
    /// Parameters of the operation.
    pub detail: OperationDetail,
    /// Download name.
    pub file_name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl ProcessedDocument {
    /// Split or merge.
    pub fn kind(&self) -> OperationKind {
        self.detail.kind()
    }

    /// The owner, absent for guest results.
    pub fn owner_id(&self) -> Option<&OwnerId> {
        self.owner.owner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_kind_roundtrip_names() {
        assert_eq!("split".parse::<OperationKind>().unwrap(), OperationKind::Split);
        assert_eq!(OperationKind::Merge.to_string(), "merge");
        assert!("rotate".parse::<OperationKind>().is_err());
    }

    #[test]
    fn test_detail_json_shape() {
        let split = OperationDetail::Split { pages: vec![3, 1] };
        assert_eq!(serde_json::to_value(&split).unwrap(), serde_json::json!({ "pages": [3, 1] }));

        let id = DocumentId::new();
        let merge = OperationDetail::Merge { sources: vec![id] };
        let value = serde_json::to_value(&merge).unwrap();
        assert_eq!(value["fileIds"][0], serde_json::json!(id.to_string()));

        let parsed: OperationDetail = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.kind(), OperationKind::Merge);
    }

    #[test]
    fn test_guest_result_has_no_owner() {
        let doc = ProcessedDocument {
            id: Uuid::new_v4(),
            owner: Identity::Anonymous,
            source_description: "a.pdf".into(),
            result: ContentRef::from_bytes(Vec::<u8>::new()),
            result_page_count: 1,
            detail: OperationDetail::Split { pages: vec![1] },
            file_name: "split_a.pdf".into(),
            created_at: Utc::now(),
        };
        assert!(doc.owner_id().is_none());
        assert_eq!(doc.kind(), OperationKind::Split);
    }
}
