//! Connection, pragma and migration tests.

use strata_core::errors::StorageError;
use strata_storage::connection::writer::with_immediate_transaction;
use strata_storage::migrations;
use strata_storage::DatabaseManager;
use tempfile::TempDir;

#[test]
fn pragmas_set_correctly() {
    let dir = TempDir::new().unwrap();
    let db = DatabaseManager::open(&dir.path().join("index.db")).unwrap();

    db.with_writer(|conn| {
        let mode: String = conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");

        let sync: i64 = conn
            .pragma_query_value(None, "synchronous", |row| row.get(0))
            .unwrap();
        assert_eq!(sync, 1, "synchronous should be NORMAL");

        let fk: i64 = conn
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);

        let timeout: i64 = conn
            .pragma_query_value(None, "busy_timeout", |row| row.get(0))
            .unwrap();
        assert_eq!(timeout, 5000);

        let vacuum: i64 = conn
            .pragma_query_value(None, "auto_vacuum", |row| row.get(0))
            .unwrap();
        assert_eq!(vacuum, 2, "fresh stores use incremental auto_vacuum");
        Ok(())
    })
    .unwrap();
}

#[test]
fn migrations_reach_latest_and_reopen_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("index.db");
    {
        let db = DatabaseManager::open(&path).unwrap();
        db.with_writer(|conn| {
            assert_eq!(migrations::current_version(conn)?, migrations::latest_version());
            Ok(())
        })
        .unwrap();
    }
    let db = DatabaseManager::open(&path).unwrap();
    db.with_writer(|conn| {
        assert_eq!(migrations::current_version(conn)?, migrations::latest_version());
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'edges'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
        Ok(())
    })
    .unwrap();
}

#[test]
fn newer_schema_is_refused_without_writing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("index.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE marker (x INTEGER); PRAGMA user_version = 99;")
            .unwrap();
    }

    let err = DatabaseManager::open(&path).err().expect("open should fail");
    assert!(matches!(
        err,
        StorageError::SchemaMismatch { found: 99, .. }
    ));

    let conn = rusqlite::Connection::open(&path).unwrap();
    let files_table: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE name = 'files'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(files_table, 0, "no migration may run against a newer store");
}

#[test]
fn failed_migration_rolls_back_entirely() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    migrations::run_migrations(&conn).unwrap();
    let before = migrations::current_version(&conn).unwrap();

    let broken: &[(&str, u32)] = &[(
        "CREATE TABLE half_done (x INTEGER); CREATE TABLE broken (",
        before + 1,
    )];
    let err = migrations::run_migration_list(&conn, broken).unwrap_err();
    assert!(matches!(err, StorageError::MigrationFailed { .. }));

    assert_eq!(migrations::current_version(&conn).unwrap(), before);
    let leftover: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE name = 'half_done'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(leftover, 0);
}

#[test]
fn readers_do_not_see_uncommitted_writes() {
    let dir = TempDir::new().unwrap();
    let db = DatabaseManager::open(&dir.path().join("index.db")).unwrap();

    db.with_writer(|conn| {
        let tx = rusqlite::Transaction::new_unchecked(
            conn,
            rusqlite::TransactionBehavior::Immediate,
        )
        .unwrap();
        tx.execute(
            "INSERT INTO runs (started_at, root, status, phase) VALUES (1, '/r', 'running', 'idle')",
            [],
        )
        .unwrap();

        let seen: i64 = db
            .with_reader(|r| Ok(r.query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0)).unwrap()))
            .unwrap();
        assert_eq!(seen, 0, "staging writes must stay invisible until commit");

        tx.commit().unwrap();
        Ok(())
    })
    .unwrap();

    let seen: i64 = db
        .with_reader(|r| Ok(r.query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0)).unwrap()))
        .unwrap();
    assert_eq!(seen, 1);
}

#[test]
fn immediate_transaction_rolls_back_on_error() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let result: Result<(), StorageError> = db.with_writer(|conn| {
        with_immediate_transaction(conn, |tx| {
            tx.execute(
                "INSERT INTO runs (started_at, root, status, phase) VALUES (1, '/r', 'running', 'idle')",
                [],
            )
            .unwrap();
            Err(StorageError::Integrity {
                message: "abort".into(),
            })
        })
    });
    assert!(result.is_err());

    let count: i64 = db
        .with_reader(|r| Ok(r.query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0)).unwrap()))
        .unwrap();
    assert_eq!(count, 0);
}
