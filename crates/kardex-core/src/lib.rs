//! # kardex-core: Pure Business Logic for the Kardex Engine
//!
//! This crate is the **heart** of the inventory-sales engine. It contains
//! all business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kardex Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 kardex-engine (Services)                        │   │
//! │  │   Inventory ─► SalesEngine ─► Stats ─► Users ─► AuditRecorder  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kardex-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   guard   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ protected │  │   rules   │  │   │
//! │  │   │   Sale    │  │  i64 cents│  │   role    │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            kardex-store (Persistence Layer)                     │   │
//! │  │     storage contracts + JSON flat-file & SQLite backends        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Variant, Sale, AuditEvent, User, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`guard`] - Access-control guard for the protected role
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use kardex_core::money::Money;
//! use kardex_core::types::{Role, UnitKind};
//! use kardex_core::guard;
//!
//! // Create money from cents (never from floats!)
//! let price = Money::from_cents(1099); // 10.99
//!
//! // A dozen is always 12 base units
//! assert_eq!(UnitKind::Dozen.default_factor(), Some(12));
//!
//! // The protected role can never be granted
//! assert!(guard::check_assign("anyone", Role::Root).is_err());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod guard;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use kardex_core::Money` instead of
// `use kardex_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Username of the pre-seeded protected account.
///
/// ## Why a constant?
/// The protected account is created exactly once, at seeding, and every
/// deployment shares it. Guard rules key off [`types::Role::Root`], not
/// this name; the constant only exists so seeding and tests agree.
pub const PROTECTED_USERNAME: &str = "admin_china";

/// Maximum lines allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and keeps checkout validation bounded.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity on a single cart line, in sold units
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum length of product names and category labels
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length of usernames
pub const MAX_USERNAME_LENGTH: usize = 50;
