//! # Backend Selection
//!
//! One configuration enum, one factory. The backend is chosen exactly
//! once, at startup; everything above this point holds trait objects and
//! never learns which implementation it is talking to.
//!
//! ## Usage
//! ```rust,ignore
//! let backend = Backend::open(BackendConfig::json("./data")).await?;
//! // or
//! let backend = Backend::open(BackendConfig::sqlite("./data/kardex.db")).await?;
//!
//! let products = backend.inventory().list().await?;
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::contracts::{AuditStore, InventoryStore, SalesStore, SettingsStore, UserStore};
use crate::error::StoreResult;
use crate::json::{
    JsonAuditStore, JsonInventoryStore, JsonSalesStore, JsonSettingsStore, JsonUserStore,
};
use crate::sqlite::{
    Database, DbConfig, SqliteAuditStore, SqliteInventoryStore, SqliteSalesStore,
    SqliteSettingsStore, SqliteUserStore,
};

// =============================================================================
// Configuration
// =============================================================================

/// Which backend to open, and where its data lives.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    /// JSON flat files under a data directory.
    Json { dir: PathBuf },
    /// SQLite database.
    Sqlite { config: DbConfig },
}

impl BackendConfig {
    pub fn json(dir: impl Into<PathBuf>) -> Self {
        BackendConfig::Json { dir: dir.into() }
    }

    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        BackendConfig::Sqlite {
            config: DbConfig::new(path),
        }
    }

    /// In-memory SQLite, for tests.
    pub fn sqlite_in_memory() -> Self {
        BackendConfig::Sqlite {
            config: DbConfig::in_memory(),
        }
    }
}

// =============================================================================
// Backend
// =============================================================================

/// The full set of opened stores, one per record family.
///
/// Cloning is cheap; each store is behind an `Arc`.
#[derive(Clone)]
pub struct Backend {
    inventory: Arc<dyn InventoryStore>,
    sales: Arc<dyn SalesStore>,
    audit: Arc<dyn AuditStore>,
    users: Arc<dyn UserStore>,
    settings: Arc<dyn SettingsStore>,
}

impl Backend {
    /// Opens the configured backend and all of its stores.
    pub async fn open(config: BackendConfig) -> StoreResult<Self> {
        match config {
            BackendConfig::Json { dir } => {
                info!(dir = %dir.display(), "Opening JSON flat-file backend");
                Ok(Backend {
                    inventory: Arc::new(JsonInventoryStore::open(&dir).await?),
                    sales: Arc::new(JsonSalesStore::open(&dir).await?),
                    audit: Arc::new(JsonAuditStore::open(&dir).await?),
                    users: Arc::new(JsonUserStore::open(&dir).await?),
                    settings: Arc::new(JsonSettingsStore::open(&dir).await?),
                })
            }
            BackendConfig::Sqlite { config } => {
                let db = Database::connect(config).await?;
                let pool = db.pool().clone();
                Ok(Backend {
                    inventory: Arc::new(SqliteInventoryStore::new(pool.clone())),
                    sales: Arc::new(SqliteSalesStore::new(pool.clone())),
                    audit: Arc::new(SqliteAuditStore::new(pool.clone())),
                    users: Arc::new(SqliteUserStore::new(pool.clone())),
                    settings: Arc::new(SqliteSettingsStore::new(pool)),
                })
            }
        }
    }

    pub fn inventory(&self) -> Arc<dyn InventoryStore> {
        self.inventory.clone()
    }

    pub fn sales(&self) -> Arc<dyn SalesStore> {
        self.sales.clone()
    }

    pub fn audit(&self) -> Arc<dyn AuditStore> {
        self.audit.clone()
    }

    pub fn users(&self) -> Arc<dyn UserStore> {
        self.users.clone()
    }

    pub fn settings(&self) -> Arc<dyn SettingsStore> {
        self.settings.clone()
    }
}
