//! In-process history store for offline use and tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;
use crate::history::{HistoryRecord, HistoryStore, NewRecord};
use crate::identity::OwnerId;

/// Keeps records in memory, newest first.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    records: RwLock<Vec<HistoryRecord>>,
}

impl MemoryHistoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records across all owners.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// True if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn create_record(&self, record: NewRecord) -> Result<HistoryRecord> {
        let stored = HistoryRecord::from_new(record, Utc::now());
        self.records.write().await.insert(0, stored.clone());
        Ok(stored)
    }

    async fn list_records(&self, owner: &OwnerId) -> Result<Vec<HistoryRecord>> {
        let mut records: Vec<HistoryRecord> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.user_id.as_ref() == Some(owner))
            .cloned()
            .collect();
        // Stable: records created in the same instant keep newest-first order.
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn delete_record(&self, id: Uuid) -> Result<()> {
        self.records.write().await.retain(|r| r.id != id);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
