//! SQLite storage for recorded SSH login attempts.
//!
//! This crate owns the single `Data` table and guards it against silent
//! schema drift. It provides:
//!
//! - **`schema`** — the canonical table definition and SQL text helpers.
//! - **`store`** — the [`Store`]: singleton lifecycle, transactional
//!   schema reconciliation, and the insert/get/delete contract.
//! - **`error`** — the [`StoreError`] taxonomy; expected failures are
//!   returned as values, never panics.
//!
//! # Quick start
//!
//! ```no_run
//! use ssh_alert_core::fields_from;
//! use ssh_alert_store::Store;
//!
//! let store = Store::acquire("Database.db").unwrap();
//! store.insert(&fields_from([("ip", "10.0.0.1".into()), ("count", 3.into())])).unwrap();
//!
//! let rows = store.get(&fields_from([("ip", "10.0.0.1".into())])).unwrap();
//! assert_eq!(rows.len(), 1);
//! ```
//!
//! # Schema reconciliation
//!
//! On first use the store opens (or creates) the database file and
//! compares the stored definition of `Data` against [`TABLE_SCHEMA`],
//! whitespace-normalized. A differing definition yields
//! [`StoreError::SchemaMismatch`] and leaves the data untouched; only an
//! explicit [`Store::reconcile`]`(true)` — the operator-confirmed reset
//! path — ever drops the table.

mod error;
mod schema;
mod store;

pub use error::{Result, StoreError};
pub use schema::{TABLE_NAME, TABLE_SCHEMA, normalize_sql, validate_column_name};
pub use store::Store;
