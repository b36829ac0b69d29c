//! Integration tests for the ssh-alert-store crate.
//!
//! Every test works on its own tempfile-backed database so the suites
//! can run in parallel.

use rusqlite::Connection;
use ssh_alert_core::{FieldMap, RequiredFields, fields_from};
use ssh_alert_store::{Store, StoreError, TABLE_SCHEMA, normalize_sql};
use tempfile::TempDir;

fn scratch_db(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("Database.db")
}

#[test]
fn test_reconcile_is_idempotent_on_fresh_store() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(scratch_db(&dir));

    store.reconcile(false).unwrap();
    store.reconcile(false).unwrap();

    // A second handle over the same file must also accept the schema.
    let again = Store::open(scratch_db(&dir));
    again.reconcile(false).unwrap();
    assert_eq!(again.count().unwrap(), 0);
}

#[test]
fn test_reconcile_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = scratch_db(&dir);

    Store::open(&path).reconcile(false).unwrap();

    // Simulate a process restart: fresh handle, existing file. The stored
    // definition must compare equal to the canonical one.
    let restarted = Store::open(&path);
    restarted.get(&FieldMap::new()).unwrap();
}

#[test]
fn test_force_reset_is_destructive_and_total() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(scratch_db(&dir));

    for i in 0..3 {
        store
            .insert(&fields_from([("ip", "10.0.0.1".into()), ("count", i.into())]))
            .unwrap();
    }
    assert_eq!(store.count().unwrap(), 3);

    store.reconcile(true).unwrap();
    assert_eq!(store.get(&FieldMap::new()).unwrap().len(), 0);

    // Numbering restarts with the recreated table.
    let number = store.insert(&fields_from([("ip", "10.0.0.2".into())])).unwrap();
    assert_eq!(number, 1);
}

#[test]
fn test_delete_without_conditions_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(scratch_db(&dir));

    store.insert(&fields_from([("ip", "10.0.0.1".into())])).unwrap();
    store.insert(&fields_from([("ip", "10.0.0.2".into())])).unwrap();

    let err = store.delete(&FieldMap::new()).unwrap_err();
    assert!(matches!(err, StoreError::SafetyRejection));
    assert_eq!(store.count().unwrap(), 2);
}

#[test]
fn test_insert_read_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(scratch_db(&dir));

    let number = store
        .insert(&fields_from([("ip", "10.0.0.1".into()), ("count", 3.into())]))
        .unwrap();

    let rows = store.get(&fields_from([("ip", "10.0.0.1".into())])).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].number, number);
    assert_eq!(rows[0].count, Some(3));
    assert_eq!(rows[0].ip.as_deref(), Some("10.0.0.1"));
    assert!(rows[0].username.is_none());
}

#[test]
fn test_conditional_delete_precision() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(scratch_db(&dir));

    store.insert(&fields_from([("ip", "A".into())])).unwrap();
    store.insert(&fields_from([("ip", "A".into())])).unwrap();
    store.insert(&fields_from([("ip", "B".into())])).unwrap();

    let removed = store.delete(&fields_from([("ip", "A".into())])).unwrap();
    assert_eq!(removed, 2);

    let remaining = store.get(&FieldMap::new()).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].ip.as_deref(), Some("B"));
}

#[test]
fn test_delete_with_multiple_conditions_is_anded() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(scratch_db(&dir));

    store
        .insert(&fields_from([("ip", "A".into()), ("username", "root".into())]))
        .unwrap();
    store
        .insert(&fields_from([("ip", "A".into()), ("username", "admin".into())]))
        .unwrap();

    let removed = store
        .delete(&fields_from([("ip", "A".into()), ("username", "root".into())]))
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_schema_mismatch_is_detected_and_nondestructive() {
    let dir = TempDir::new().unwrap();
    let path = scratch_db(&dir);

    // Pre-existing table with a missing column.
    let wrong_schema = "CREATE TABLE Data (
        Number INTEGER PRIMARY KEY AUTOINCREMENT,
        Count INTEGER,
        IP TEXT
    )";
    let conn = Connection::open(&path).unwrap();
    conn.execute(wrong_schema, []).unwrap();
    conn.execute("INSERT INTO Data (IP) VALUES ('10.0.0.1')", []).unwrap();
    drop(conn);

    let store = Store::open(&path);
    let err = store.reconcile(false).unwrap_err();
    assert!(matches!(err, StoreError::SchemaMismatch { ref table } if table == "Data"));

    // The existing table and its data are untouched.
    let conn = Connection::open(&path).unwrap();
    let stored: String = conn
        .query_row(
            "SELECT sql FROM sqlite_master WHERE type='table' AND name='Data'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(normalize_sql(&stored), normalize_sql(wrong_schema));
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM Data", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_force_reset_repairs_mismatched_schema() {
    let dir = TempDir::new().unwrap();
    let path = scratch_db(&dir);

    let conn = Connection::open(&path).unwrap();
    conn.execute("CREATE TABLE Data (Number INTEGER PRIMARY KEY)", [])
        .unwrap();
    drop(conn);

    let store = Store::open(&path);
    assert!(matches!(
        store.reconcile(false),
        Err(StoreError::SchemaMismatch { .. })
    ));

    store.reconcile(true).unwrap();
    store.reconcile(false).unwrap();

    let conn = Connection::open(&path).unwrap();
    let stored: String = conn
        .query_row(
            "SELECT sql FROM sqlite_master WHERE type='table' AND name='Data'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(normalize_sql(&stored), normalize_sql(TABLE_SCHEMA));
}

#[test]
fn test_field_names_are_case_insensitive() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(scratch_db(&dir));

    store.insert(&fields_from([("IP", "1.2.3.4".into())])).unwrap();
    store.insert(&fields_from([("ip", "1.2.3.4".into())])).unwrap();

    // Both spellings land in the same column and match the same query.
    let rows = store.get(&fields_from([("Ip", "1.2.3.4".into())])).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].ip, rows[1].ip);
}

#[test]
fn test_get_rejects_unknown_field() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(scratch_db(&dir));

    let err = store
        .get(&fields_from([("hostname", "example".into())]))
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidField(ref name) if name == "hostname"));
}

#[test]
fn test_delete_rejects_unknown_field() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(scratch_db(&dir));

    let err = store
        .delete(&fields_from([("hostname", "example".into())]))
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidField(_)));
}

#[test]
fn test_insert_passes_unknown_identifier_through_to_engine() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(scratch_db(&dir));

    // A well-formed identifier that is not a column: the engine rejects
    // it, surfaced as a storage failure rather than a panic.
    let err = store
        .insert(&fields_from([("Extra", "x".into())]))
        .unwrap_err();
    assert!(matches!(err, StoreError::Storage(_)));

    // A malformed key never reaches the engine.
    let err = store
        .insert(&fields_from([("IP; DROP TABLE Data", "x".into())]))
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidField(_)));
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_insert_with_no_fields_stores_empty_row() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(scratch_db(&dir));

    let number = store.insert(&FieldMap::new()).unwrap();
    let rows = store.get(&FieldMap::new()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].number, number);
    assert!(rows[0].ip.is_none());
}

#[test]
fn test_validator_rejection_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = scratch_db(&dir);
    let store = Store::with_validator(&path, Box::new(RequiredFields::standard()));

    let err = store
        .insert(&fields_from([("ip", "10.0.0.1".into()), ("count", 3.into())]))
        .unwrap_err();
    match err {
        StoreError::Validation(message) => {
            assert!(message.contains("missing mandatory field"));
        }
        other => panic!("expected Validation, got {other:?}"),
    }
    assert_eq!(store.count().unwrap(), 0);

    // A complete record goes through.
    let number = store
        .insert(&fields_from([
            ("ip", "10.0.0.1".into()),
            ("password", "hunter2".into()),
            ("version", "SSH-2.0-OpenSSH_9.6".into()),
            ("session_id", "abc123".into()),
            ("location", "Somewhere".into()),
            ("date", "2026-01-15".into()),
            ("time", "12:30:00".into()),
            ("count", 1.into()),
        ]))
        .unwrap();
    assert_eq!(number, 1);
}

#[test]
fn test_get_returns_storage_order() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(scratch_db(&dir));

    for ip in ["C", "A", "B"] {
        store.insert(&fields_from([("ip", ip.into())])).unwrap();
    }

    let rows = store.get(&FieldMap::new()).unwrap();
    let ips: Vec<&str> = rows.iter().filter_map(|r| r.ip.as_deref()).collect();
    assert_eq!(ips, ["C", "A", "B"]);
    assert!(rows.windows(2).all(|w| w[0].number < w[1].number));
}
