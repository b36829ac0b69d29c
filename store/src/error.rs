//! Error types for store operations.
//!
//! Expected failure conditions are returned as values, never panics:
//! callers check results rather than installing handlers. Only
//! [`SchemaMismatch`](StoreError::SchemaMismatch) signals an environment
//! problem the store will not heal on its own; the host decides whether
//! to surface it, halt, or walk the operator through a force-reset.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The on-disk table definition differs from the expected schema.
    /// The store refuses to operate rather than silently altering or
    /// dropping existing data.
    #[error(
        "schema mismatch: on-disk definition of table '{table}' differs from the expected \
         schema; reset the database to recreate it (destroys existing data)"
    )]
    SchemaMismatch {
        /// Name of the mismatched table.
        table: String,
    },

    /// The record failed validation; nothing was written.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A delete was attempted with no conditions. Unconditional deletes
    /// are refused outright; use a force-reset to clear the store.
    #[error("refusing to delete without conditions: at least one condition is required")]
    SafetyRejection,

    /// Engine-level I/O or constraint failure.
    #[error("database error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A field name outside the catalog (or, for insert pass-through,
    /// not a plain identifier).
    #[error("unknown field: '{0}'")]
    InvalidField(String),
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
