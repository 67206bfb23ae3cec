//! Git history through indexing runs: per-file signals, incremental
//! walks and repositories without history.

use std::fs;
use std::path::Path;

use git2::{Oid, Repository, Signature, Time};
use strata_analysis::pipeline::{IndexContext, Indexer, RunOptions, RunStatus};
use strata_analysis::RunReport;
use strata_core::config::FingerprintMode;
use strata_core::types::FileId;
use strata_core::StrataConfig;
use strata_storage::queries::history::{self, FileStatsRecord};
use strata_storage::DatabaseManager;
use tempfile::TempDir;

/// Write `files` under the work tree and commit them on HEAD.
fn commit(repo: &Repository, files: &[(&str, &str)], email: &str, when: i64) -> Oid {
    let workdir = repo.workdir().unwrap().to_path_buf();
    let mut index = repo.index().unwrap();
    for (rel, body) in files {
        let abs = workdir.join(rel);
        fs::create_dir_all(abs.parent().unwrap()).unwrap();
        fs::write(&abs, body).unwrap();
        index.add_path(Path::new(rel)).unwrap();
    }
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let name = email.split('@').next().unwrap();
    let sig = Signature::new(name, email, &Time::new(when, 0)).unwrap();
    let parent = repo.head().ok().map(|h| h.peel_to_commit().unwrap());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, "change", &tree, &parents).unwrap()
}

fn context(root: &Path) -> IndexContext {
    let mut config = StrataConfig::default();
    config.scan.fingerprint = Some(FingerprintMode::Hash);
    config.history.enabled = Some(true);
    IndexContext::new(root, config)
}

fn run(ctx: &IndexContext, db: &DatabaseManager) -> RunReport {
    Indexer::new(ctx, db).run(&RunOptions::default()).expect("run")
}

fn stats(db: &DatabaseManager, path: &str) -> FileStatsRecord {
    let id = FileId::derive(path).raw();
    db.with_reader(|c| history::file_stats_for(c, &[id]))
        .unwrap()
        .into_iter()
        .next()
        .unwrap_or_else(|| panic!("no stats for {path}"))
}

/// Three commits under `app/`: alice adds a, bob adds b, alice edits both.
fn repository() -> (TempDir, Repository) {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    commit(&repo, &[("app/a.py", "def a():\n    return 1\n")], "alice@example.com", 1_000);
    commit(&repo, &[("app/b.py", "def b():\n    return 2\n")], "bob@example.com", 2_000);
    commit(
        &repo,
        &[
            ("app/a.py", "def a():\n    return 10\n"),
            ("app/b.py", "def b():\n    return 20\n"),
        ],
        "alice@example.com",
        3_000,
    );
    (dir, repo)
}

#[test]
fn test_first_run_records_history_signals() {
    let (dir, _repo) = repository();
    let ctx = context(&dir.path().join("app"));
    let db = DatabaseManager::open(&ctx.db_path()).unwrap();
    let report = run(&ctx, &db);

    assert!(report.history.enabled);
    assert!(report.history.error.is_none());
    assert_eq!(report.history.commits_walked, 3);
    assert_eq!(report.history.commits_recorded, 3);

    let a = stats(&db, "a.py");
    assert_eq!(a.commit_count, 2);
    assert_eq!(a.churn, 2 + 2);
    assert_eq!(a.distinct_authors, 1);
    assert_eq!(a.top_owner.as_deref(), Some("alice@example.com"));
    assert!((a.owner_share - 1.0).abs() < 1e-9);

    // one commit each: the tie goes to the smaller name
    let b = stats(&db, "b.py");
    assert_eq!(b.commit_count, 2);
    assert_eq!(b.distinct_authors, 2);
    assert_eq!(b.top_owner.as_deref(), Some("alice@example.com"));
    assert!((b.owner_share - 0.5).abs() < 1e-9);
    assert!(b.health >= 1.0 && b.health <= 10.0);
}

#[test]
fn test_new_commit_is_walked_incrementally() {
    let (dir, repo) = repository();
    let ctx = context(&dir.path().join("app"));
    let db = DatabaseManager::open(&ctx.db_path()).unwrap();
    run(&ctx, &db);

    let head = commit(&repo, &[("app/a.py", "def a():\n    return 100\n")], "carol@example.com", 4_000);
    let report = run(&ctx, &db);
    assert_eq!(report.files.changed, 1);
    assert_eq!(report.history.commits_walked, 1);
    assert!(!report.history.reset);
    assert_eq!(report.history.head, Some(head.to_string()));

    let a = stats(&db, "a.py");
    assert_eq!(a.commit_count, 3);
    assert_eq!(a.distinct_authors, 2);
    assert_eq!(stats(&db, "b.py").commit_count, 2);
    assert_eq!(db.with_reader(history::count_commits).unwrap(), 4);
}

#[test]
fn test_head_move_outside_root_still_commits() {
    let (dir, repo) = repository();
    let ctx = context(&dir.path().join("app"));
    let db = DatabaseManager::open(&ctx.db_path()).unwrap();
    run(&ctx, &db);

    // the tree under app/ is clean but HEAD moved
    commit(&repo, &[("docs/notes.md", "notes\n")], "bob@example.com", 5_000);
    let report = run(&ctx, &db);
    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.files.parsed, 0);
    assert_eq!(report.history.commits_walked, 1);
    assert_eq!(stats(&db, "a.py").commit_count, 2);

    let again = run(&ctx, &db);
    assert_eq!(again.status, RunStatus::UpToDate);
}

#[test]
fn test_directory_without_repository_indexes_without_history() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.py"), "def a():\n    return 1\n").unwrap();
    let ctx = context(dir.path());
    let db = DatabaseManager::open(&ctx.db_path()).unwrap();
    let report = run(&ctx, &db);

    assert_eq!(report.status, RunStatus::Completed);
    assert!(report.history.enabled);
    assert!(report.history.head.is_none());
    assert!(report.history.error.is_none());
    assert_eq!(stats(&db, "a.py").commit_count, 0);
}
