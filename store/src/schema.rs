//! The canonical table definition and SQL text helpers.
//!
//! There is exactly one table, `Data`, and exactly one acceptable
//! definition for it. Reconciliation compares the definition SQLite has
//! on disk against [`TABLE_SCHEMA`] after whitespace normalization; any
//! semantic difference is a hard mismatch, never a migration trigger.

use crate::error::{Result, StoreError};

/// Name of the single table holding recorded attempts.
pub const TABLE_NAME: &str = "Data";

/// The canonical `Data` table definition.
///
/// `Number` is the store-assigned primary key; every other column is
/// nullable. The constant carries no trailing semicolon so the text
/// SQLite records in `sqlite_master` matches it exactly.
pub const TABLE_SCHEMA: &str = "CREATE TABLE Data (
    Number INTEGER PRIMARY KEY AUTOINCREMENT,
    Count INTEGER,
    Date TEXT,
    Time TEXT,
    IP TEXT,
    UserName TEXT,
    Password TEXT,
    Version TEXT,
    SessionID TEXT,
    Location TEXT
)";

/// Normalizes SQL text for schema comparison.
///
/// Collapses all whitespace runs to single spaces and strips a trailing
/// semicolon. SQLite stores a CREATE statement without its terminating
/// semicolon, so both sides must be normalized the same way for
/// reconciliation to be idempotent across restarts.
pub fn normalize_sql(sql: &str) -> String {
    let collapsed = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.trim_end_matches(';').trim_end().to_string()
}

/// Validates a column name used in dynamically assembled SQL.
///
/// Insert keys that are not in the field catalog pass through as literal
/// column names; this guard keeps that permissiveness from admitting
/// anything but plain identifiers.
///
/// # Errors
///
/// Returns [`StoreError::InvalidField`] if the name is empty or contains
/// characters other than alphanumerics and underscores.
pub fn validate_column_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(StoreError::InvalidField(name.to_string()));
    }
    if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(StoreError::InvalidField(name.to_string()));
    }
    Ok(())
}
