//! Anonymous usage quota.
//!
//! Guests may run a limited number of split/merge operations. The counter
//! lives outside the transform code; the workspace asks [`UsageGate::check`]
//! before starting an anonymous operation and calls
//! [`UsageGate::record_use`] only after it succeeded.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, warn};

/// Answer of a quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuestAllowance {
    /// Whether another anonymous operation may run.
    pub allowed: bool,
    /// Operations left.
    pub remaining: u32,
    /// Total operations a guest gets.
    pub limit: u32,
}

/// Yes/no gate in front of anonymous operations.
#[async_trait]
pub trait UsageGate: Send + Sync + fmt::Debug {
    /// Current allowance.
    fn check(&self) -> GuestAllowance;

    /// Count one successful operation; returns the new usage count.
    async fn record_use(&self) -> u32;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UsageFile {
    used: u32,
}

/// Counter with an optional JSON file so usage survives restarts.
///
/// An unreadable or malformed file counts as no usage; a failed write is
/// logged and the in-memory count still advances.
#[derive(Debug)]
pub struct GuestQuota {
    limit: u32,
    used: AtomicU32,
    file: Option<PathBuf>,
}

impl GuestQuota {
    /// A quota that forgets usage when the process exits.
    pub fn in_memory(limit: u32) -> Self {
        Self {
            limit,
            used: AtomicU32::new(0),
            file: None,
        }
    }

    /// A quota persisted in `file`, starting from the count stored there.
    pub async fn open(limit: u32, file: impl Into<PathBuf>) -> Self {
        let file = file.into();
        let used = match tokio::fs::read(&file).await {
            Ok(bytes) => serde_json::from_slice::<UsageFile>(&bytes)
                .map(|u| u.used)
                .unwrap_or_else(|e| {
                    warn!(path = %file.display(), error = %e, "ignoring malformed usage file");
                    0
                }),
            Err(_) => 0,
        };
        debug!(used, limit, "guest quota loaded");

        Self {
            limit,
            used: AtomicU32::new(used),
            file: Some(file),
        }
    }

    /// Operations used so far.
    pub fn used(&self) -> u32 {
        self.used.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UsageGate for GuestQuota {
    fn check(&self) -> GuestAllowance {
        let used = self.used();
        GuestAllowance {
            allowed: used < self.limit,
            remaining: self.limit.saturating_sub(used),
            limit: self.limit,
        }
    }

    async fn record_use(&self) -> u32 {
        let used = self.used.fetch_add(1, Ordering::SeqCst).saturating_add(1);

        if let Some(file) = &self.file {
            let write = async {
                let json = serde_json::to_vec(&UsageFile { used }).map_err(std::io::Error::other)?;
                tokio::fs::write(file, json).await
            };
            if let Err(e) = write.await {
                warn!(path = %file.display(), error = %e, "cannot persist guest usage");
            }
        }
        used
    }
}
