//! # Error Types
//!
//! Domain-specific error types for kardex-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  kardex-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  kardex-store errors (separate crate)                                   │
//! │  └── StoreError       - Persistence failures                            │
//! │                                                                         │
//! │  kardex-engine errors                                                   │
//! │  └── EngineError      - Core + Store, what service callers see          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (SKU, variant id, username)
//! 3. Errors are enum variants, never String
//! 4. Business rule failures are recoverable and reported to the caller;
//!    they are never swallowed and never conflated with storage failures

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations and domain logic failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout was attempted with an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Product cannot be found.
    #[error("Product not found: {0}")]
    UnknownProduct(u32),

    /// Variant cannot be found on the referenced product.
    #[error("Variant {variant_id} not found on product {product_id}")]
    UnknownVariant { product_id: u32, variant_id: String },

    /// The variant is not sold in the requested unit.
    #[error("Variant {variant_id} is not sold as {unit}")]
    UnknownUnit { variant_id: String, unit: String },

    /// Insufficient stock to complete a sale or adjustment.
    ///
    /// Quantities are in the variant's base unit. `available` is what the
    /// variant could still satisfy at the moment of validation, so the
    /// caller can show "requested 3, only 2 left" without a second lookup.
    #[error("Insufficient stock for {sku} ({variant_id}): available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        variant_id: String,
        available: i64,
        requested: i64,
    },

    /// An operation tried to cross the protected-role boundary.
    ///
    /// The protected role (`Role::Root`) is pre-seeded and structurally
    /// immutable: it can never be assigned, revoked, or have its holder
    /// deleted. Raised only by the [`crate::guard`] module.
    #[error("Protected role violation for '{username}': {detail}")]
    ProtectedRoleViolation { username: String, detail: String },

    /// Removing or demoting this user would leave the system without admins.
    #[error("'{username}' is the last admin and cannot be removed or demoted")]
    LastAdmin { username: String },

    /// An operator tried to delete their own account.
    #[error("'{username}' cannot delete their own account")]
    SelfDelete { username: String },

    /// A user with this name already exists.
    #[error("User '{0}' already exists")]
    DuplicateUser(String),

    /// User cannot be found.
    #[error("User not found: '{0}'")]
    UnknownUser(String),

    /// Login failed. Deliberately does not say whether the username or
    /// the password was wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Role string could not be parsed into a known role.
    #[error("Unknown role: '{0}'")]
    UnknownRole(String),

    /// Arithmetic on quantities or money overflowed.
    #[error("Arithmetic overflow while computing {context}")]
    Overflow { context: &'static str },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a ProtectedRoleViolation with a standard detail message
    /// for the given rejected transition.
    pub fn protected(username: impl Into<String>, detail: impl Into<String>) -> Self {
        CoreError::ProtectedRoleViolation {
            username: username.into(),
            detail: detail.into(),
        }
    }

    /// True for the violations the engine records as security audit events.
    pub fn is_security_relevant(&self) -> bool {
        matches!(self, CoreError::ProtectedRoleViolation { .. })
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, raised before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: &'static str },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    /// Invalid format (bad characters, bad shape).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
