//! # kardex-engine: Transaction Engine Services
//!
//! The only layer where business rules meet storage.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        kardex-engine                                    │
//! │                                                                         │
//! │  Engine::open(BackendConfig)                                            │
//! │       │                                                                 │
//! │       ├──► Inventory     catalog CRUD, variants, stock adjustment       │
//! │       ├──► SalesEngine   atomic cart checkout ────┐                     │
//! │       │         └── shared stock lock ◄───────────┘                     │
//! │       ├──► Stats         profit & loss, daily breakdown (read-only)     │
//! │       ├──► Users         accounts, roles, guard, preferences            │
//! │       └──► AuditRecorder append-only trail, never fails the caller      │
//! │                                                                         │
//! │  kardex-core: the rules      kardex-store: the records                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use kardex_engine::Engine;
//! use kardex_store::BackendConfig;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = Engine::open(BackendConfig::json("./data")).await?;
//! let products = engine.inventory().list_products().await?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod audit;
pub mod engine;
pub mod error;
pub mod inventory;
pub mod sales;
pub mod stats;
pub mod users;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use audit::AuditRecorder;
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use inventory::{Inventory, NewProduct};
pub use sales::SalesEngine;
pub use stats::{DailyPnl, PnlReport, Stats};
pub use users::Users;
