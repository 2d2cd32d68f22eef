//! # Engine Error Types
//!
//! What service callers see: business rule failures and storage failures,
//! kept apart.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CoreError   (kardex-core)  ──┐                                         │
//! │  StoreError  (kardex-store) ──┼──► EngineError                          │
//! │  argon2 failures            ──┘                                         │
//! │                                                                         │
//! │  Rules:                                                                 │
//! │  • Core(...) means the request was invalid; the caller can fix it       │
//! │  • Store(...) means the backend failed; propagated as-is, never         │
//! │    retried here and never translated into a business failure            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use kardex_core::{CoreError, ValidationError};
use kardex_store::StoreError;

/// Failures surfaced by the engine services.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Business rule violation from kardex-core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Persistence failure from kardex-store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Password hashing or verification infrastructure failed.
    ///
    /// Not a wrong password (that is `CoreError::InvalidCredentials`);
    /// this means argon2 itself could not run or the stored hash is not
    /// a valid PHC string.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::Core(CoreError::Validation(err))
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
