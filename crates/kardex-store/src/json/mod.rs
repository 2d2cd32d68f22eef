//! # JSON Flat-File Backend
//!
//! One JSON document per record family, rewritten whole on every mutation.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Atomic Whole-File Replacement                         │
//! │                                                                         │
//! │  save(record)                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  acquire family lock (tokio::sync::Mutex)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  read products.json ──► Vec<Product> ──► mutate in memory               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  serialize ──► write products.json.tmp ──► rename over products.json    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  release lock                                                           │
//! │                                                                         │
//! │  rename() is atomic on POSIX and NTFS: readers observe either the old   │
//! │  or the new complete document, never a torn write. A crash mid-write    │
//! │  leaves at worst a stale .tmp file, which the next write replaces.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! One async mutex per family serializes read-modify-write cycles within
//! the process. Reads outside a mutation take a point-in-time snapshot of
//! the file. Multi-process access is out of scope for this backend.

mod audit;
mod inventory;
mod sales;
mod settings;
mod users;

pub use audit::JsonAuditStore;
pub use inventory::JsonInventoryStore;
pub use sales::JsonSalesStore;
pub use settings::JsonSettingsStore;
pub use users::JsonUserStore;

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Shared Family File
// =============================================================================

/// A single family's JSON document plus the lock that serializes its
/// read-modify-write cycles.
pub(crate) struct FamilyFile<T> {
    path: PathBuf,
    entity: &'static str,
    lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> FamilyFile<T>
where
    T: Serialize + DeserializeOwned + Send,
{
    pub(crate) fn new(dir: &Path, file_name: &str, entity: &'static str) -> Self {
        FamilyFile {
            path: dir.join(file_name),
            entity,
            lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    /// Reads the full family. A missing file is an empty family, not an
    /// error: the first write creates it.
    pub(crate) async fn load(&self) -> StoreResult<Vec<T>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };

        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::corrupt(self.entity, e.to_string()))
    }

    /// Runs a read-modify-write cycle under the family lock.
    ///
    /// The closure mutates the in-memory records; the result is written
    /// back atomically before the lock is released.
    pub(crate) async fn update<R, F>(&self, mutate: F) -> StoreResult<R>
    where
        R: Send,
        F: FnOnce(&mut Vec<T>) -> StoreResult<R> + Send,
    {
        let _guard = self.lock.lock().await;

        let mut records = self.load().await?;
        let out = mutate(&mut records)?;
        self.replace(&records).await?;

        Ok(out)
    }

    /// Writes the full family via temp-file + rename.
    async fn replace(&self, records: &[T]) -> StoreResult<()> {
        let tmp = self.path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(records)
            .map_err(|e| StoreError::corrupt(self.entity, e.to_string()))?;

        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(
            entity = self.entity,
            count = records.len(),
            path = %self.path.display(),
            "Family file replaced"
        );
        Ok(())
    }
}

/// Ensures the data directory exists. Called once per store at open.
pub(crate) async fn ensure_dir(dir: &Path) -> StoreResult<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| StoreError::Unavailable(format!("{}: {e}", dir.display())))
}

// =============================================================================
// Unit Tests
// =============================================================================
