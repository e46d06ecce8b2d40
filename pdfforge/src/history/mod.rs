//! Processing history: the durable record of completed operations.
//!
//! The workspace only ever talks to a [`HistoryStore`]. Which implementation
//! backs it is decided once, by [`open_store`], from the configuration:
//!
//! - [`MemoryHistoryStore`] keeps records in process memory.
//! - [`RemoteHistoryStore`] writes them to a REST table.
//!
//! Store failures surface as [`PdfForgeError::Persistence`], which callers
//! treat as a warning: the session keeps working without the store.
//!
//! [`PdfForgeError::Persistence`]: crate::PdfForgeError::Persistence

pub mod memory;
pub mod record;
pub mod remote;

pub use memory::MemoryHistoryStore;
pub use record::{HistoryRecord, NewRecord, OperationData};
pub use remote::RemoteHistoryStore;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::error::Result;
use crate::identity::OwnerId;

/// Durable storage of processed-document records, keyed by owner.
#[async_trait]
pub trait HistoryStore: Send + Sync + fmt::Debug {
    /// Persist a record and return it as stored.
    async fn create_record(&self, record: NewRecord) -> Result<HistoryRecord>;

    /// Records of one owner, most recent first.
    async fn list_records(&self, owner: &OwnerId) -> Result<Vec<HistoryRecord>>;

    /// Delete a record. Deleting an unknown id succeeds.
    async fn delete_record(&self, id: Uuid) -> Result<()>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Create the store described by `config`.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn HistoryStore>> {
    let store: Arc<dyn HistoryStore> = match config {
        StoreConfig::Memory => Arc::new(MemoryHistoryStore::new()),
        StoreConfig::Remote {
            base_url,
            api_key,
            table,
        } => Arc::new(RemoteHistoryStore::new(base_url, api_key, table)?),
    };
    info!(backend = store.backend(), "history store ready");
    Ok(store)
}
