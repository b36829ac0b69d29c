//! The store: lifecycle, schema reconciliation, and CRUD.
//!
//! A [`Store`] owns the path to the backing database file. Every
//! operation opens its own [`Connection`] and releases it on every exit
//! path; SQLite's file-level locking is the only serialization between
//! concurrent callers. Readiness (open-or-create plus schema
//! reconciliation) is established at most once per handle, lazily on
//! first operation or eagerly through [`Store::acquire`].
//!
//! # Example
//!
//! ```no_run
//! use ssh_alert_core::fields_from;
//! use ssh_alert_store::Store;
//!
//! let store = Store::open("Database.db");
//! let number = store.insert(&fields_from([("ip", "10.0.0.1".into())])).unwrap();
//! let rows = store.get(&fields_from([("ip", "10.0.0.1".into())])).unwrap();
//! assert_eq!(rows[0].number, number);
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, params_from_iter};
use tracing::{debug, info, warn};

use ssh_alert_core::{AttemptRecord, FieldMap, FieldValue, LogicalField, RecordValidator};

use crate::error::{Result, StoreError};
use crate::schema::{TABLE_NAME, TABLE_SCHEMA, normalize_sql, validate_column_name};

/// Process-wide store handle. Populated on the first successful
/// [`Store::acquire`]; left empty when initialization fails so a later
/// call retries from scratch instead of reusing a broken instance.
static INSTANCE: Mutex<Option<Arc<Store>>> = Mutex::new(None);

const SELECT_COLUMNS: &str =
    "Number, Count, Date, Time, IP, UserName, Password, Version, SessionID, Location";

/// The persistent store of recorded login attempts.
///
/// Operations are independent, short-lived units of work: each opens its
/// own connection, runs inside its own transaction scope where needed,
/// and returns expected failures as [`StoreError`] values.
pub struct Store {
    path: PathBuf,
    validator: Option<Box<dyn RecordValidator>>,
    ready: Mutex<bool>,
}

impl Store {
    /// Returns the process-wide store instance, creating it if absent.
    ///
    /// The instance is cached only after schema reconciliation succeeds.
    /// A failed initialization leaves the slot empty, so the next call
    /// retries rather than being stuck on a poisoned singleton.
    ///
    /// The path is fixed by whichever call creates the instance;
    /// subsequent calls return the existing instance regardless of the
    /// path they pass.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SchemaMismatch`] when an existing database
    /// carries an incompatible table definition, or
    /// [`StoreError::Storage`] for engine-level failures.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Arc<Store>> {
        let mut slot = INSTANCE.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(store) = slot.as_ref() {
            return Ok(Arc::clone(store));
        }

        let store = Store::open(path);
        store.ensure_ready()?;
        let store = Arc::new(store);
        *slot = Some(Arc::clone(&store));
        Ok(store)
    }

    /// Creates a standalone handle for the database at `path`.
    ///
    /// No validator is installed: the storage layer treats every data
    /// column as optional. Readiness is deferred to the first operation.
    pub fn open(path: impl AsRef<Path>) -> Store {
        Store {
            path: path.as_ref().to_path_buf(),
            validator: None,
            ready: Mutex::new(false),
        }
    }

    /// Creates a standalone handle with a record validator that is
    /// consulted before every insert.
    pub fn with_validator(
        path: impl AsRef<Path>,
        validator: Box<dyn RecordValidator>,
    ) -> Store {
        Store {
            path: path.as_ref().to_path_buf(),
            validator: Some(validator),
            ready: Mutex::new(false),
        }
    }

    /// Path of the backing database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reconciles the on-disk schema with the canonical definition.
    ///
    /// With `force_reset` the table is dropped (if present) and created
    /// fresh, destroying all data. Otherwise the table is created when
    /// missing, accepted when its stored definition matches
    /// [`TABLE_SCHEMA`] after whitespace normalization, and rejected with
    /// [`StoreError::SchemaMismatch`] when it differs — existing data is
    /// never altered outside the explicit force-reset path.
    ///
    /// The check and any write happen under a single transaction, so
    /// concurrent callers cannot observe a half-reconciled schema.
    pub fn reconcile(&self, force_reset: bool) -> Result<()> {
        let mut ready = self.ready.lock().unwrap_or_else(PoisonError::into_inner);
        self.reconcile_locked(force_reset)?;
        *ready = true;
        Ok(())
    }

    /// Establishes readiness exactly once per handle.
    fn ensure_ready(&self) -> Result<()> {
        let mut ready = self.ready.lock().unwrap_or_else(PoisonError::into_inner);
        if !*ready {
            self.reconcile_locked(false)?;
            *ready = true;
        }
        Ok(())
    }

    fn reconcile_locked(&self, force_reset: bool) -> Result<()> {
        // Connection::open creates the file, so capture existence first.
        let file_existed = self.path.exists();
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        if force_reset {
            tx.execute(&format!("DROP TABLE IF EXISTS {TABLE_NAME}"), [])?;
            tx.execute(TABLE_SCHEMA, [])?;
            tx.commit()?;
            info!(path = %self.path.display(), "recreated table from scratch");
            return Ok(());
        }

        if !file_existed {
            tx.execute(TABLE_SCHEMA, [])?;
            tx.commit()?;
            info!(path = %self.path.display(), "created new database");
            return Ok(());
        }

        let stored: Option<String> = tx
            .query_row(
                "SELECT sql FROM sqlite_master WHERE type='table' AND name=?1",
                [TABLE_NAME],
                |row| row.get(0),
            )
            .optional()?;

        match stored {
            None => {
                tx.execute(TABLE_SCHEMA, [])?;
                tx.commit()?;
                info!(path = %self.path.display(), "created missing table");
            }
            Some(sql) if normalize_sql(&sql) == normalize_sql(TABLE_SCHEMA) => {
                tx.commit()?;
                debug!(path = %self.path.display(), "schema verified");
            }
            Some(_) => {
                // Dropping the transaction rolls back; the table is untouched.
                warn!(path = %self.path.display(), "on-disk schema differs from expected definition");
                return Err(StoreError::SchemaMismatch {
                    table: TABLE_NAME.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Inserts one record, returning the assigned `Number`.
    ///
    /// The validator (when installed) sees the raw logical-field mapping
    /// before any normalization; a rejected record performs no write.
    /// Keys are normalized through the field catalog; unknown keys pass
    /// through unchanged as literal column names, provided they are plain
    /// identifiers. Columns not supplied are left NULL.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] when the validator rejects the record,
    /// [`StoreError::InvalidField`] when a pass-through key is not a
    /// plain identifier, [`StoreError::Storage`] for engine failures.
    pub fn insert(&self, fields: &FieldMap) -> Result<i64> {
        self.ensure_ready()?;

        if let Some(validator) = &self.validator {
            let errors = validator.validate(fields);
            if let Some(first) = errors.first() {
                return Err(StoreError::Validation(first.to_string()));
            }
        }

        let conn = self.connect()?;
        if fields.is_empty() {
            conn.execute(&format!("INSERT INTO {TABLE_NAME} DEFAULT VALUES"), [])?;
            return Ok(conn.last_insert_rowid());
        }

        let mut columns = Vec::with_capacity(fields.len());
        let mut values = Vec::with_capacity(fields.len());
        for (key, value) in fields {
            let column = match LogicalField::parse(key) {
                Some(field) => field.column().to_string(),
                None => {
                    validate_column_name(key)?;
                    key.clone()
                }
            };
            columns.push(column);
            values.push(to_sql_value(value));
        }

        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {TABLE_NAME} ({}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        );

        conn.execute(&sql, params_from_iter(values))?;
        let number = conn.last_insert_rowid();
        debug!(number, "inserted record");
        Ok(number)
    }

    /// Queries records matching all conditions (exact equality, AND-ed).
    ///
    /// Empty conditions return every row. Results come back in storage
    /// order (`Number` ascending); there is no pagination.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidField`] when a condition key is outside the
    /// field catalog.
    pub fn get(&self, conditions: &FieldMap) -> Result<Vec<AttemptRecord>> {
        self.ensure_ready()?;

        let (sql, values) = if conditions.is_empty() {
            (
                format!("SELECT {SELECT_COLUMNS} FROM {TABLE_NAME} ORDER BY Number"),
                Vec::new(),
            )
        } else {
            let (where_clause, values) = build_conditions(conditions)?;
            (
                format!(
                    "SELECT {SELECT_COLUMNS} FROM {TABLE_NAME} WHERE {where_clause} ORDER BY Number"
                ),
                values,
            )
        };

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(values), |row| {
                Ok(AttemptRecord {
                    number: row.get(0)?,
                    count: row.get(1)?,
                    date: row.get(2)?,
                    time: row.get(3)?,
                    ip: row.get(4)?,
                    username: row.get(5)?,
                    password: row.get(6)?,
                    version: row.get(7)?,
                    session_id: row.get(8)?,
                    location: row.get(9)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Deletes records matching all conditions, returning the number
    /// removed.
    ///
    /// Empty conditions are refused with [`StoreError::SafetyRejection`]
    /// before any statement is issued — an unconditional wipe must go
    /// through [`reconcile(true)`](Store::reconcile) instead.
    ///
    /// # Errors
    ///
    /// [`StoreError::SafetyRejection`] on empty conditions,
    /// [`StoreError::InvalidField`] for keys outside the catalog.
    pub fn delete(&self, conditions: &FieldMap) -> Result<usize> {
        self.ensure_ready()?;

        if conditions.is_empty() {
            return Err(StoreError::SafetyRejection);
        }

        let (where_clause, values) = build_conditions(conditions)?;
        let sql = format!("DELETE FROM {TABLE_NAME} WHERE {where_clause}");

        let conn = self.connect()?;
        let removed = conn.execute(&sql, params_from_iter(values))?;
        debug!(removed, "deleted records");
        Ok(removed)
    }

    /// Total number of stored records.
    pub fn count(&self) -> Result<i64> {
        self.ensure_ready()?;
        let conn = self.connect()?;
        let count =
            conn.query_row(&format!("SELECT COUNT(*) FROM {TABLE_NAME}"), [], |row| {
                row.get(0)
            })?;
        Ok(count)
    }

    fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.path)?)
    }
}

/// Builds a `WHERE` clause from condition keys, validating each key
/// strictly against the field catalog.
fn build_conditions(conditions: &FieldMap) -> Result<(String, Vec<Value>)> {
    let mut clauses = Vec::with_capacity(conditions.len());
    let mut values = Vec::with_capacity(conditions.len());
    for (index, (key, value)) in conditions.iter().enumerate() {
        let field = LogicalField::parse(key)
            .ok_or_else(|| StoreError::InvalidField(key.clone()))?;
        clauses.push(format!("{} = ?{}", field.column(), index + 1));
        values.push(to_sql_value(value));
    }
    Ok((clauses.join(" AND "), values))
}

fn to_sql_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Integer(i) => Value::Integer(*i),
        FieldValue::Text(s) => Value::Text(s.clone()),
    }
}
