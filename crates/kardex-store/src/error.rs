//! # Storage Error Types
//!
//! Error types for persistence operations, shared by both backends.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  JSON backend: std::io::Error / serde_json::Error                      │
//! │  SQLite backend: sqlx::Error / MigrateError                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds context and categorization            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  EngineError (kardex-engine) ← What service callers see                │
//! │                                                                         │
//! │  Storage failures are never conflated with business rule failures:     │
//! │  a StoreError means the backend could not do its job, not that the     │
//! │  request was invalid.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Persistence failures.
///
/// These wrap backend-native errors and provide context for debugging
/// and operator feedback.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found where the contract requires one.
    ///
    /// Lookups return `Option`; this variant is for operations that
    /// update or delete a record that must already exist.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Unique key violation (duplicate SKU, receipt, or username).
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Backend could not be opened or reached.
    ///
    /// ## When This Occurs
    /// - Data directory cannot be created
    /// - Database file cannot be created or opened
    /// - File permissions issue, disk full
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A stored record could not be decoded.
    ///
    /// ## When This Occurs
    /// - Hand-edited JSON file with invalid content
    /// - JSON column written by an incompatible version
    #[error("Corrupt record in {entity}: {detail}")]
    Corrupt { entity: &'static str, detail: String },

    /// File I/O failed (JSON backend).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Query execution failed (SQLite backend).
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Connection pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and key.
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// Creates a Corrupt error for a record that failed to decode.
    pub fn corrupt(entity: &'static str, detail: impl Into<String>) -> Self {
        StoreError::Corrupt {
            entity,
            detail: detail.into(),
        }
    }
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database (UNIQUE)  → StoreError::UniqueViolation
/// sqlx::Error::PoolTimedOut       → StoreError::PoolExhausted
/// sqlx::Error::PoolClosed         → StoreError::Unavailable
/// Other                           → StoreError::QueryFailed
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite reports constraints in the message text:
                // "UNIQUE constraint failed: <table>.<column>"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    StoreError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else {
                    StoreError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,

            sqlx::Error::PoolClosed => StoreError::Unavailable("pool is closed".to_string()),

            other => StoreError::QueryFailed(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
