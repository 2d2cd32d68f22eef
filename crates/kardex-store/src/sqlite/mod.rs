//! # SQLite Backend
//!
//! Relational implementation of the storage contracts on async SQLite.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SQLite Backend                                     │
//! │                                                                         │
//! │  DbConfig ──► Database::connect ──► SqlitePool (WAL, FKs, migrations)  │
//! │                     │                                                   │
//! │                     ├──► SqliteInventoryStore   products                │
//! │                     ├──► SqliteSalesStore       sales                   │
//! │                     ├──► SqliteAuditStore       audit_log               │
//! │                     ├──► SqliteUserStore        users                   │
//! │                     └──► SqliteSettingsStore    settings                │
//! │                                                                         │
//! │  Nested structures (variants, sale lines, audit details) live in        │
//! │  JSON text columns: the contracts move whole records, so nothing        │
//! │  here ever reconstructs a record from joins.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries are runtime-checked (`sqlx::query` / `query_as`, not the
//! compile-time macros), so the workspace builds without a prepared
//! database.

mod audit;
mod inventory;
mod migrations;
mod pool;
mod sales;
mod settings;
mod users;

pub use audit::SqliteAuditStore;
pub use inventory::SqliteInventoryStore;
pub use pool::{Database, DbConfig};
pub use sales::SqliteSalesStore;
pub use settings::SqliteSettingsStore;
pub use users::SqliteUserStore;
