//! # kardex-store: Persistence Layer for the Kardex Engine
//!
//! Storage contracts plus two interchangeable backends.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       kardex-store                                      │
//! │                                                                         │
//! │  kardex-engine services                                                 │
//! │       │            program against traits only                          │
//! │       ▼                                                                 │
//! │  ┌───────────────────────────────────────────────┐                     │
//! │  │        contracts (one trait per family)       │                     │
//! │  │  InventoryStore  SalesStore  AuditStore       │                     │
//! │  │  UserStore       SettingsStore                │                     │
//! │  └──────────┬─────────────────────┬──────────────┘                     │
//! │             │                     │                                     │
//! │             ▼                     ▼                                     │
//! │  ┌────────────────────┐ ┌────────────────────┐                         │
//! │  │   json (flat file) │ │  sqlite (sqlx)     │                         │
//! │  │  one doc per family│ │  WAL + migrations  │                         │
//! │  │  tmp-file + rename │ │  JSON columns for  │                         │
//! │  │  per-family mutex  │ │  nested structures │                         │
//! │  └────────────────────┘ └────────────────────┘                         │
//! │                                                                         │
//! │  backend::Backend picks one at startup; nothing above learns which.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Contract Rules (every backend)
//! - `save` is an upsert keyed by the record's domain key
//! - lookups return `Option`, never an error for absence
//! - `delete` reports whether a record was removed
//! - keys are owned by the domain, never generated by the backend
//! - records cross the boundary whole; no partial updates
//! - sales and audit events are immutable once written

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod contracts;
pub mod error;
pub mod json;
pub mod sqlite;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use backend::{Backend, BackendConfig};
pub use contracts::{AuditStore, InventoryStore, SalesStore, SettingsStore, UserStore};
pub use error::{StoreError, StoreResult};
pub use sqlite::DbConfig;
