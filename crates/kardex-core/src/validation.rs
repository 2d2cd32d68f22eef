//! # Validation Module
//!
//! Input validation for the inventory-sales engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (UI / API surface)                                     │
//! │  ├── Basic format checks (empty, length)                                │
//! │  └── Immediate user feedback                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (engine entry points)                             │
//! │  ├── Field-level rules (lengths, ranges, formats)                       │
//! │  └── Structural rules (cart shape, unit factors)                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend (SQLite constraints / JSON invariants)                │
//! │  └── NOT NULL, UNIQUE, key integrity                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{Cart, UnitKind};
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY, MAX_NAME_LENGTH, MAX_USERNAME_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 200 characters
///
/// ## Example
/// ```rust
/// use kardex_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Winter socks 42-44").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required { field: "name" });
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name",
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates a category label. Empty is allowed (uncategorized).
pub fn validate_category(category: &str) -> ValidationResult<()> {
    if category.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "category",
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

/// Validates a username.
///
/// ## Rules
/// - Must not be empty
/// - 3 to 50 characters
/// - Letters, numbers, underscores, dots and hyphens only
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required { field: "username" });
    }

    if username.len() < 3 {
        return Err(ValidationError::TooShort {
            field: "username",
            min: 3,
        });
    }

    if username.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "username",
            max: MAX_USERNAME_LENGTH,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '.' || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "username",
            reason: "must contain only letters, numbers, underscores, dots, and hyphens",
        });
    }

    Ok(())
}

/// Validates a plain-text password before hashing.
///
/// ## Rules
/// - At least 4 characters (local deployments, not internet-facing auth)
/// - At most 128 characters
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.len() < 4 {
        return Err(ValidationError::TooShort {
            field: "password",
            min: 4,
        });
    }
    if password.len() > 128 {
        return Err(ValidationError::TooLong {
            field: "password",
            max: 128,
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale or adjustment quantity, in sold units.
///
/// ## Rules
/// - Must be positive
/// - Must be at most `MAX_LINE_QUANTITY` (fat-finger guard)
///
/// ## Example
/// ```rust
/// use kardex_core::validation::validate_quantity;
///
/// assert!(validate_quantity(5).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(-1).is_err());
/// ```
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive { field: "quantity" });
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity",
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a unit conversion factor (base units per sold unit).
///
/// Kinds with an inherent size (piece, pair, dozen) must carry exactly
/// that factor; container kinds must carry a positive custom factor.
pub fn validate_unit_factor(kind: UnitKind, factor: i64) -> ValidationResult<()> {
    if factor <= 0 {
        return Err(ValidationError::MustBePositive { field: "factor" });
    }
    if let Some(expected) = kind.default_factor() {
        if factor != expected {
            return Err(ValidationError::InvalidFormat {
                field: "factor",
                reason: "does not match the unit's inherent size",
            });
        }
    }
    Ok(())
}

/// Validates a money amount used as a price or cost basis.
pub fn validate_amount(field: &'static str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBePositive { field });
    }
    Ok(())
}

/// Validates a low-stock threshold.
pub fn validate_stock_min(stock_min: i64) -> ValidationResult<()> {
    if stock_min < 0 {
        return Err(ValidationError::MustBePositive { field: "stock_min" });
    }
    Ok(())
}

// =============================================================================
// Structural Validators
// =============================================================================

/// Validates the shape of a cart before checkout begins.
///
/// Line-level existence checks (product, variant, unit, stock) belong to
/// the sales engine's validation phase; this only rejects carts that are
/// structurally unusable.
pub fn validate_cart_shape(cart: &Cart) -> ValidationResult<()> {
    if cart.lines.len() > MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "cart lines",
            min: 1,
            max: MAX_CART_LINES as i64,
        });
    }
    for line in &cart.lines {
        validate_quantity(line.quantity)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
