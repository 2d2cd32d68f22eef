//! # Storage Contracts
//!
//! One trait per record family. The engine programs against these traits
//! only; a backend is chosen once at startup and every implementation is
//! a drop-in replacement for the others.
//!
//! ## Contract Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Record Families                                     │
//! │                                                                         │
//! │  InventoryStore   products (with variants & units)   save/get/list/del │
//! │  SalesStore       immutable sales                     save/get/list    │
//! │  AuditStore       append-only audit trail             append/get/list  │
//! │  UserStore        users & roles                       save/get/list/del│
//! │  SettingsStore    per-user preferences                save/get/del     │
//! │                                                                         │
//! │  Rules every backend must honour:                                       │
//! │  • save is an upsert keyed by the record's domain key                   │
//! │  • get by key returns Option, never an error for absence                │
//! │  • delete returns whether a record was removed                          │
//! │  • keys are owned by the domain, never generated by the backend         │
//! │  • records cross the boundary whole (no partial updates)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why whole-record semantics
//! Both backends can then share one mental model: the JSON backend rewrites
//! a family file atomically, the SQLite backend upserts a row. Callers never
//! depend on column-level behaviour.

use async_trait::async_trait;

use kardex_core::types::{AuditEvent, Product, Sale, Settings, User};

use crate::error::StoreResult;

// =============================================================================
// Inventory
// =============================================================================

/// Persistence contract for the product catalog.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Upserts a product, keyed by `product.id`. The whole record is
    /// replaced, variants and units included.
    async fn save(&self, product: &Product) -> StoreResult<()>;

    /// Fetches a product by id. Absence is `Ok(None)`.
    async fn get(&self, id: u32) -> StoreResult<Option<Product>>;

    /// Lists all products, ordered by id.
    async fn list(&self) -> StoreResult<Vec<Product>>;

    /// Deletes a product. Returns whether a record was removed.
    async fn delete(&self, id: u32) -> StoreResult<bool>;

    /// Next free product id (max existing + 1, starting at 1).
    ///
    /// Callers serialize product creation; this is a read, not a
    /// reservation.
    async fn next_product_id(&self) -> StoreResult<u32>;
}

// =============================================================================
// Sales
// =============================================================================

/// Persistence contract for the sales ledger.
///
/// Sales are immutable once saved: there is no update or delete.
/// Corrections are new compensating records.
#[async_trait]
pub trait SalesStore: Send + Sync {
    /// Persists a completed sale. The receipt number must be unused.
    async fn save(&self, sale: &Sale) -> StoreResult<()>;

    /// Fetches a sale by receipt number. Absence is `Ok(None)`.
    async fn get(&self, receipt: &str) -> StoreResult<Option<Sale>>;

    /// Lists all sales in receipt order (oldest first).
    async fn list(&self) -> StoreResult<Vec<Sale>>;

    /// Next receipt number: `B000001`, `B000002`, ...
    ///
    /// Monotonic because sales are never deleted. Checkout holds the
    /// stock lock while calling this, so numbering is race-free.
    async fn next_receipt(&self) -> StoreResult<String>;
}

// =============================================================================
// Audit
// =============================================================================

/// Persistence contract for the append-only audit trail.
///
/// Deliberately has no delete: tampering with history is not an
/// operation the contract can express.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Appends an event to the trail.
    async fn append(&self, event: &AuditEvent) -> StoreResult<()>;

    /// Lists events, newest first. `limit` bounds the result when given.
    ///
    /// Ordering follows append order, not event timestamps.
    async fn list(&self, limit: Option<usize>) -> StoreResult<Vec<AuditEvent>>;

    /// Fetches a single event by id. Absence is `Ok(None)`.
    async fn get(&self, id: &str) -> StoreResult<Option<AuditEvent>>;
}

// =============================================================================
// Users
// =============================================================================

/// Persistence contract for users and their roles.
///
/// Access-control rules (protected role, last admin, self-delete) live in
/// `kardex_core::guard` and the engine; a store only moves records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Upserts a user, keyed by username.
    async fn save(&self, user: &User) -> StoreResult<()>;

    /// Fetches a user by username. Absence is `Ok(None)`.
    async fn get(&self, username: &str) -> StoreResult<Option<User>>;

    /// Lists all users, ordered by username.
    async fn list(&self) -> StoreResult<Vec<User>>;

    /// Deletes a user. Returns whether a record was removed.
    async fn delete(&self, username: &str) -> StoreResult<bool>;
}

// =============================================================================
// Settings
// =============================================================================

/// Persistence contract for per-user preferences.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Upserts a settings record, keyed by username.
    async fn save(&self, settings: &Settings) -> StoreResult<()>;

    /// Fetches settings for a user. Absence is `Ok(None)`; callers fall
    /// back to defaults.
    async fn get(&self, username: &str) -> StoreResult<Option<Settings>>;

    /// Deletes settings for a user. Returns whether a record was removed.
    async fn delete(&self, username: &str) -> StoreResult<bool>;
}
