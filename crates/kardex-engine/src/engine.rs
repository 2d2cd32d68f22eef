//! # Engine Assembly
//!
//! Opens a backend and wires every service to it, sharing one audit
//! recorder and one stock lock across the lot.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use kardex_store::{Backend, BackendConfig};

use crate::audit::AuditRecorder;
use crate::error::EngineResult;
use crate::inventory::Inventory;
use crate::sales::SalesEngine;
use crate::stats::Stats;
use crate::users::Users;

/// The assembled engine: one backend, all services.
///
/// Cloning is cheap; services share their stores and the stock lock.
#[derive(Clone)]
pub struct Engine {
    inventory: Inventory,
    sales: SalesEngine,
    stats: Stats,
    users: Users,
    audit: AuditRecorder,
}

impl Engine {
    /// Opens the configured backend and assembles the services.
    ///
    /// The stock lock created here is shared by the inventory manager
    /// and the sales engine: every stock mutation in the process runs
    /// under the same critical section.
    pub async fn open(config: BackendConfig) -> EngineResult<Self> {
        let backend = Backend::open(config).await?;
        info!("Engine services assembled");
        Ok(Engine::from_backend(backend))
    }

    /// Assembles services over an already-open backend.
    pub fn from_backend(backend: Backend) -> Self {
        let audit = AuditRecorder::new(backend.audit());
        let stock_lock = Arc::new(Mutex::new(()));

        let inventory = Inventory::new(backend.inventory(), audit.clone(), stock_lock.clone());
        let sales = SalesEngine::new(
            backend.inventory(),
            backend.sales(),
            audit.clone(),
            stock_lock,
        );
        let stats = Stats::new(backend.sales(), backend.inventory());
        let users = Users::new(backend.users(), backend.settings(), audit.clone());

        Engine {
            inventory,
            sales,
            stats,
            users,
            audit,
        }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn sales(&self) -> &SalesEngine {
        &self.sales
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn users(&self) -> &Users {
        &self.users
    }

    pub fn audit(&self) -> &AuditRecorder {
        &self.audit
    }
}
