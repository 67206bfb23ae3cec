//! Indexing runs end to end: incremental rebuilds, idempotence, the run
//! lock, cancellation and the persisted run report.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use strata_analysis::pipeline::{IndexContext, Indexer, RunLock, RunOptions, RunStatus};
use strata_core::config::FingerprintMode;
use strata_core::constants::LOCK_FILE_NAME;
use strata_core::errors::{LockError, PipelineError};
use strata_core::types::{FileId, SymbolId};
use strata_core::{Cancellable, CancellationToken, StrataConfig};
use strata_storage::queries::{edges, file_edges, files, history, runs, snapshots, symbols};
use strata_storage::DatabaseManager;
use tempfile::TempDir;

// ---- Helpers ----

fn config(fingerprint: FingerprintMode) -> StrataConfig {
    let mut config = StrataConfig::default();
    config.scan.fingerprint = Some(fingerprint);
    config.history.enabled = Some(false);
    config
}

fn context(root: &Path) -> IndexContext {
    IndexContext::new(root, config(FingerprintMode::Hash))
}

fn open_db(ctx: &IndexContext) -> DatabaseManager {
    DatabaseManager::open(&ctx.db_path()).expect("open store")
}

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, body).unwrap();
}

/// a defines foo, b imports a and calls a.foo, c declares nothing.
fn scenario() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.py", "def foo():\n    return 1\n");
    write(dir.path(), "b.py", "import a\na.foo()\n");
    write(dir.path(), "c.py", "VALUE = 42\n");
    dir
}

fn foo_id() -> i64 {
    SymbolId::derive("a.py", 0).raw()
}

fn run(ctx: &IndexContext, db: &DatabaseManager) -> strata_analysis::RunReport {
    Indexer::new(ctx, db).run(&RunOptions::default()).expect("run")
}

/// Symbols and edges as comparable rows, provenance included.
fn graph_rows(db: &DatabaseManager) -> (Vec<symbols::SymbolRecord>, Vec<edges::EdgeRecord>) {
    db.with_reader(|c| Ok((symbols::all_symbols(c)?, edges::all_edges(c)?)))
        .unwrap()
}

// ---- Scenario ----

#[test]
fn test_scenario_symbols_and_call_edge() {
    let dir = scenario();
    let ctx = context(dir.path());
    let db = open_db(&ctx);
    let report = run(&ctx, &db);

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.files.new, 3);
    assert_eq!(report.symbols_total, 2);
    assert_eq!(report.edges_total, 1);

    db.with_reader(|c| {
        assert_eq!(edges::fan_in(c, foo_id())?, 1);
        let callers = edges::callers(c, foo_id())?;
        assert_eq!(callers.len(), 1);
        assert_eq!(callers[0].path, "b.py");
        assert_eq!(callers[0].kind, "call");

        let c_id = FileId::derive("c.py").raw();
        assert_eq!(edges::count_edges_touching_file(c, c_id)?, 0);

        let deps = file_edges::dependencies_of(c, FileId::derive("b.py").raw())?;
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].target_file_id, FileId::derive("a.py").raw());
        assert_eq!(deps[0].weight, 1);
        Ok(())
    })
    .unwrap();
}

#[test]
fn test_deleting_caller_removes_edge() {
    let dir = scenario();
    let ctx = context(dir.path());
    let db = open_db(&ctx);
    run(&ctx, &db);

    fs::remove_file(dir.path().join("b.py")).unwrap();
    let report = run(&ctx, &db);
    assert_eq!(report.files.deleted, 1);
    assert_eq!(report.files.parsed, 0);

    db.with_reader(|c| {
        assert_eq!(edges::count_edges(c)?, 0);
        assert_eq!(edges::fan_in(c, foo_id())?, 0);
        assert_eq!(symbols::count_symbols(c)?, 1);
        assert!(file_edges::all_file_edges(c)?.is_empty());

        // The row stays for historical joins, marked removed.
        let b = files::file_by_path(c, "b.py")?.unwrap();
        assert!(b.removed_at.is_some());
        assert_eq!(files::count_live_files(c)?, 2);
        Ok(())
    })
    .unwrap();
}

#[test]
fn test_deleting_callee_and_restoring_it() {
    let dir = scenario();
    let ctx = context(dir.path());
    let db = open_db(&ctx);
    run(&ctx, &db);

    fs::remove_file(dir.path().join("a.py")).unwrap();
    run(&ctx, &db);
    assert_eq!(db.with_reader(edges::count_edges).unwrap(), 0);

    write(dir.path(), "a.py", "def foo():\n    return 1\n");
    let report = run(&ctx, &db);
    // b was not edited but is re-resolved because foo came back.
    assert_eq!(report.files.re_resolved, 1);
    assert_eq!(db.with_reader(|c| edges::fan_in(c, foo_id())).unwrap(), 1);
}

// ---- Idempotence and incremental equivalence ----

#[test]
fn test_reindexing_unchanged_tree_is_up_to_date() {
    let dir = scenario();
    let ctx = context(dir.path());
    let db = open_db(&ctx);
    run(&ctx, &db);
    let before = graph_rows(&db);
    let snapshots_before = db.with_reader(snapshots::count_snapshots).unwrap();

    let report = run(&ctx, &db);
    assert!(report.is_up_to_date());
    assert_eq!(report.files.parsed, 0);
    assert_eq!(report.files.unchanged, 3);
    assert_eq!(graph_rows(&db), before);
    assert_eq!(db.with_reader(snapshots::count_snapshots).unwrap(), snapshots_before);

    let latest = db.with_reader(runs::latest_run).unwrap().unwrap();
    assert_eq!(latest.status, "up_to_date");
}

#[test]
fn test_forced_run_reparses_and_matches() {
    let dir = scenario();
    let ctx = context(dir.path());
    let db = open_db(&ctx);
    run(&ctx, &db);
    let before = graph_rows(&db);

    let options = RunOptions {
        force: true,
        ..Default::default()
    };
    let report = Indexer::new(&ctx, &db).run(&options).unwrap();
    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.files.parsed, 3);
    assert_eq!(graph_rows(&db), before);
}

#[test]
fn test_incremental_equals_from_scratch() {
    let body_b2 = "import a\n\ndef bar():\n    a.foo()\n    helper()\n\ndef helper():\n    pass\n";

    let incremental = scenario();
    let ctx = context(incremental.path());
    let db = open_db(&ctx);
    run(&ctx, &db);
    let a_before = db
        .with_reader(|c| symbols::symbols_for_files(c, &[FileId::derive("a.py").raw()]))
        .unwrap();
    write(incremental.path(), "b.py", body_b2);
    let report = run(&ctx, &db);
    assert_eq!(report.files.changed, 1);
    assert_eq!(report.files.parsed, 1);
    let a_after = db
        .with_reader(|c| symbols::symbols_for_files(c, &[FileId::derive("a.py").raw()]))
        .unwrap();
    assert_eq!(a_before, a_after);

    let scratch = scenario();
    write(scratch.path(), "b.py", body_b2);
    let scratch_ctx = context(scratch.path());
    let scratch_db = open_db(&scratch_ctx);
    run(&scratch_ctx, &scratch_db);

    assert_eq!(graph_rows(&db), graph_rows(&scratch_db));
    let fe = |db: &DatabaseManager| db.with_reader(file_edges::all_file_edges).unwrap();
    assert_eq!(fe(&db), fe(&scratch_db));
}

#[test]
fn test_touch_without_edit_is_not_reparsed() {
    let dir = scenario();
    let ctx = IndexContext::new(dir.path(), config(FingerprintMode::Mtime));
    let db = open_db(&ctx);
    run(&ctx, &db);

    let later = SystemTime::now() + Duration::from_secs(30);
    let file = fs::File::options()
        .write(true)
        .open(dir.path().join("a.py"))
        .unwrap();
    file.set_modified(later).unwrap();
    drop(file);

    let report = run(&ctx, &db);
    assert!(report.is_up_to_date());
    assert_eq!(report.files.touched, 1);
    assert_eq!(report.files.unchanged, 3);
    assert_eq!(report.files.parsed, 0);
}

// ---- Failures leave the previous snapshot ----

#[test]
fn test_cancelled_run_keeps_previous_graph() {
    let dir = scenario();
    let ctx = context(dir.path());
    let db = open_db(&ctx);
    run(&ctx, &db);
    let before = graph_rows(&db);

    write(dir.path(), "b.py", "def replaced():\n    pass\n");
    let cancel = CancellationToken::new();
    cancel.cancel();
    let options = RunOptions {
        force: false,
        cancel,
    };
    let err = Indexer::new(&ctx, &db).run(&options).unwrap_err();
    assert!(matches!(err, PipelineError::Cancelled | PipelineError::Scan(_)));
    assert_eq!(graph_rows(&db), before);

    let failed = db.with_reader(runs::latest_run).unwrap().unwrap();
    assert_eq!(failed.status, "failed");
    assert!(failed.error.is_some());

    // The next run picks the edit up.
    let report = run(&ctx, &db);
    assert_eq!(report.files.changed, 1);
    assert_eq!(db.with_reader(edges::count_edges).unwrap(), 0);
}

#[test]
fn test_concurrent_run_fails_fast() {
    let dir = scenario();
    let ctx = context(dir.path());
    let db = open_db(&ctx);

    let mut held = RunLock::open(&ctx.index_dir()).unwrap();
    let second = held.hold(|| Indexer::new(&ctx, &db).run(&RunOptions::default())).unwrap();
    match second {
        Err(PipelineError::Lock(LockError::ConcurrentRunConflict { pid, .. })) => {
            assert_eq!(pid, Some(std::process::id()));
        }
        other => panic!("expected a conflict, got {other:?}"),
    }
    assert_eq!(db.with_reader(runs::count_runs).unwrap(), 0);
}

#[test]
fn test_stale_lock_blocks_until_cleared() {
    let dir = scenario();
    let ctx = context(dir.path());
    let db = open_db(&ctx);
    fs::write(ctx.index_dir().join(LOCK_FILE_NAME), "999999 1700000000\n").unwrap();

    let err = Indexer::new(&ctx, &db).run(&RunOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Lock(LockError::StaleLock { pid: Some(999999), .. })
    ));
    // Still stale on a second attempt: nothing clears it implicitly.
    assert!(Indexer::new(&ctx, &db).run(&RunOptions::default()).is_err());

    assert!(RunLock::clear_stale(&ctx.index_dir()).unwrap());
    let report = run(&ctx, &db);
    assert_eq!(report.status, RunStatus::Completed);
    assert!(RunLock::stale_record(&ctx.index_dir()).unwrap().is_none());
}

// ---- Report ----

#[test]
fn test_report_is_persisted_and_parse_failures_counted() {
    let dir = scenario();
    write(dir.path(), "broken.py", "def broken(:\n    return (\n");
    let ctx = context(dir.path());
    let db = open_db(&ctx);
    let report = run(&ctx, &db);

    assert_eq!(report.parse_failures.count(), 1);
    assert_eq!(report.parse_failures.sample_paths, vec!["broken.py".to_string()]);
    let analytics = report.analytics.as_ref().unwrap();
    assert_eq!(analytics.nodes, report.symbols_total as usize);
    let health = report.health.unwrap();
    assert!((0.0..=100.0).contains(&health.score));

    let stored = db.with_reader(runs::latest_completed_run).unwrap().unwrap();
    assert_eq!(stored.status, "completed");
    assert_eq!(stored.phase, "committed");
    assert_eq!(stored.files_parsed, 4);
    let json: serde_json::Value = serde_json::from_str(stored.report_json.as_deref().unwrap()).unwrap();
    assert_eq!(json["run_id"], stored.id);
    assert_eq!(json["phase"], "committed");
    assert_eq!(json["parse_failures"]["partial"], 1);

    let broken = db
        .with_reader(|c| files::file_by_path(c, "broken.py"))
        .unwrap()
        .unwrap();
    assert_eq!(broken.parse_status, "partial");
    assert!(broken.parse_errors > 0);

    let snapshot = db.with_reader(snapshots::latest_snapshot).unwrap().unwrap();
    assert_eq!(snapshot.run_id, stored.id);
    assert_eq!(snapshot.health_score, health.score);
}

// ---- Health ----

const KNOT: &str = "\
def knot(x):
    if x and x > 1:
        for i in x:
            while i:
                break
    return x
";

#[test]
fn test_complex_function_lowers_file_health() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "flat.py", "def flat(x):\n    return x\n");
    write(dir.path(), "knot.py", KNOT);
    let ctx = context(dir.path());
    let db = open_db(&ctx);
    assert_eq!(run(&ctx, &db).status, RunStatus::Completed);

    db.with_reader(|c| {
        let knot = symbols::symbol_by_id(c, SymbolId::derive("knot.py", 0).raw())?.unwrap();
        // if 1, `and` 1, for 2, while 4, break 1
        assert_eq!(knot.cognitive_complexity, 9);
        let flat = symbols::symbol_by_id(c, SymbolId::derive("flat.py", 0).raw())?.unwrap();
        assert_eq!(flat.cognitive_complexity, 0);

        let flat_id = files::file_by_path(c, "flat.py")?.unwrap().id;
        let knot_id = files::file_by_path(c, "knot.py")?.unwrap().id;
        let health = |id: i64| -> f64 {
            history::file_stats_for(c, &[id]).unwrap()[0].health
        };
        // -1 for the symbol complexity, -0.5 for the deeper indentation
        assert_eq!(health(flat_id) - health(knot_id), 1.5);
        Ok(())
    })
    .unwrap();
}
