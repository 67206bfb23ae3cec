//! Commit history via `git2`.
//!
//! Commits are walked from HEAD newest first along first parents. When a
//! previous head is known and HEAD descends from it, only the new commits
//! are walked. Paths are rewritten relative to the indexed root, and
//! changes outside it are dropped.

use std::path::Path;

use git2::{DiffOptions, ErrorCode, Oid, Patch, Repository, Sort};
use strata_core::errors::HistoryError;
use strata_core::types::interning::normalize_path;
use strata_core::{Cancellable, CancellationToken};
use strata_storage::queries::history::{CommitRecord, FileChangeRecord};

/// One commit with its per-file line counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitChanges {
    pub commit: CommitRecord,
    pub changes: Vec<FileChangeRecord>,
}

/// New history since the stored head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryDelta {
    pub head: String,
    /// Stored history no longer matches HEAD and must be discarded first.
    pub reset: bool,
    /// Newest first.
    pub commits: Vec<CommitChanges>,
}

fn git_err(e: git2::Error) -> HistoryError {
    HistoryError::Git {
        message: e.message().to_string(),
    }
}

struct Repo {
    repo: Repository,
    /// Indexed root relative to the work tree, forward slashes, "" at the top.
    prefix: String,
}

fn open(root: &Path) -> Result<Option<Repo>, HistoryError> {
    let repo = match Repository::discover(root) {
        Ok(repo) => repo,
        Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
        Err(e) => return Err(git_err(e)),
    };
    let Some(workdir) = repo.workdir().map(Path::to_path_buf) else {
        return Err(HistoryError::NotARepository {
            path: root.display().to_string(),
        });
    };
    let canon = |p: &Path| p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
    let prefix = canon(root)
        .strip_prefix(canon(&workdir))
        .map(|p: &Path| normalize_path(&p.to_string_lossy()))
        .unwrap_or_default();
    Ok(Some(Repo { repo, prefix }))
}

fn head_oid(repo: &Repository) -> Result<Option<Oid>, HistoryError> {
    match repo.head() {
        Ok(head) => Ok(Some(head.peel_to_commit().map_err(git_err)?.id())),
        Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
        Err(e) => Err(git_err(e)),
    }
}

/// HEAD of the repository containing `root`, or `None` outside a
/// repository or before the first commit.
pub fn current_head(root: &Path) -> Result<Option<String>, HistoryError> {
    let Some(repo) = open(root)? else {
        return Ok(None);
    };
    Ok(head_oid(&repo.repo)?.map(|oid| oid.to_string()))
}

/// Walk commits not yet recorded. `Ok(None)` means there is no history to
/// read (no repository or no commits), which callers log and skip.
pub fn read_history(
    root: &Path,
    last_head: Option<&str>,
    max_commits: usize,
    cancel: &CancellationToken,
) -> Result<Option<HistoryDelta>, HistoryError> {
    let Some(Repo { repo, prefix }) = open(root)? else {
        tracing::info!(root = %root.display(), "no git repository, history disabled");
        return Ok(None);
    };
    let Some(head) = head_oid(&repo)? else {
        tracing::info!("repository has no commits, history disabled");
        return Ok(None);
    };

    let mut walk = repo.revwalk().map_err(git_err)?;
    walk.set_sorting(Sort::TIME).map_err(git_err)?;
    walk.simplify_first_parent().map_err(git_err)?;
    walk.push(head).map_err(git_err)?;

    let mut reset = false;
    if let Some(last) = last_head.and_then(|h| Oid::from_str(h).ok()) {
        if last == head {
            return Ok(Some(HistoryDelta {
                head: head.to_string(),
                reset: false,
                commits: Vec::new(),
            }));
        }
        let descends = repo.find_commit(last).is_ok()
            && repo.graph_descendant_of(head, last).map_err(git_err)?;
        if descends {
            walk.hide(last).map_err(git_err)?;
        } else {
            reset = true;
        }
    } else if last_head.is_some() {
        reset = true;
    }

    let mut commits = Vec::new();
    for oid in walk.take(max_commits) {
        // The caller checks the token again and discards a partial walk.
        if cancel.is_cancelled() {
            break;
        }
        let oid = oid.map_err(git_err)?;
        commits.push(read_commit(&repo, oid, &prefix)?);
    }
    Ok(Some(HistoryDelta {
        head: head.to_string(),
        reset,
        commits,
    }))
}

fn read_commit(repo: &Repository, oid: Oid, prefix: &str) -> Result<CommitChanges, HistoryError> {
    let commit = repo.find_commit(oid).map_err(git_err)?;
    let tree = commit.tree().map_err(git_err)?;
    let parent_tree = match commit.parent_count() {
        0 => None,
        _ => Some(commit.parent(0).and_then(|p| p.tree()).map_err(git_err)?),
    };
    let mut opts = DiffOptions::new();
    opts.ignore_submodules(true);
    let diff = repo
        .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))
        .map_err(git_err)?;

    let mut changes = Vec::new();
    for idx in 0..diff.deltas().len() {
        let Some(delta) = diff.get_delta(idx) else {
            continue;
        };
        let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path()) else {
            continue;
        };
        let Some(rel) = relative_to(prefix, path) else {
            continue;
        };
        let (added, removed) = match Patch::from_diff(&diff, idx).map_err(git_err)? {
            Some(patch) => {
                let (_, a, r) = patch.line_stats().map_err(git_err)?;
                (a as i64, r as i64)
            }
            None => (0, 0),
        };
        changes.push(FileChangeRecord {
            path: rel,
            lines_added: added,
            lines_removed: removed,
        });
    }
    changes.sort_by(|a, b| a.path.cmp(&b.path));
    changes.dedup_by(|a, b| a.path == b.path);

    let author = commit.author();
    Ok(CommitChanges {
        commit: CommitRecord {
            hash: oid.to_string(),
            author: author
                .email()
                .or_else(|| author.name())
                .unwrap_or("unknown")
                .to_string(),
            timestamp: commit.time().seconds(),
            // Counted over the whole commit, including files outside the root.
            file_count: diff.deltas().len() as i64,
        },
        changes,
    })
}

fn relative_to(prefix: &str, path: &Path) -> Option<String> {
    let path = normalize_path(&path.to_string_lossy());
    if prefix.is_empty() {
        return Some(path);
    }
    path.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;

    fn commit_file(repo: &Repository, rel: &str, body: &str, when: i64) -> Oid {
        let workdir = repo.workdir().unwrap().to_path_buf();
        let abs = workdir.join(rel);
        std::fs::create_dir_all(abs.parent().unwrap()).unwrap();
        std::fs::write(&abs, body).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(rel)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::new("dev", "dev@example.com", &git2::Time::new(when, 0)).unwrap();
        let parents: Vec<git2::Commit<'_>> = head_oid(repo)
            .unwrap()
            .map(|h| repo.find_commit(h).unwrap())
            .into_iter()
            .collect();
        let refs: Vec<&git2::Commit<'_>> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, "change", &tree, &refs).unwrap()
    }

    #[test]
    fn test_missing_repository_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let got = read_history(dir.path(), None, 10, &CancellationToken::new()).unwrap();
        assert!(got.is_none());
        assert_eq!(current_head(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_full_then_incremental_walk() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, "a.py", "x = 1\n", 1_000);
        let second = commit_file(&repo, "a.py", "x = 1\ny = 2\n", 2_000);

        let cancel = CancellationToken::new();
        let full = read_history(dir.path(), None, 10, &cancel).unwrap().unwrap();
        assert_eq!(full.commits.len(), 2);
        assert_eq!(full.head, second.to_string());
        assert_eq!(full.commits[0].changes[0].lines_added, 1);

        commit_file(&repo, "b.py", "z = 3\n", 3_000);
        let delta = read_history(dir.path(), Some(&full.head), 10, &cancel).unwrap().unwrap();
        assert!(!delta.reset);
        assert_eq!(delta.commits.len(), 1);
        assert_eq!(delta.commits[0].changes[0].path, "b.py");

        let same = read_history(dir.path(), Some(&delta.head), 10, &cancel).unwrap().unwrap();
        assert!(same.commits.is_empty());
    }

    #[test]
    fn test_paths_are_relative_to_indexed_root() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, "pkg/a.py", "x = 1\n", 1_000);
        commit_file(&repo, "other/b.py", "y = 1\n", 2_000);
        let delta = read_history(&dir.path().join("pkg"), None, 10, &CancellationToken::new())
            .unwrap()
            .unwrap();
        let paths: Vec<&str> = delta
            .commits
            .iter()
            .flat_map(|c| c.changes.iter().map(|ch| ch.path.as_str()))
            .collect();
        assert_eq!(paths, vec!["a.py"]);
    }

    #[test]
    fn test_max_commits_caps_the_walk() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        for i in 0..5 {
            commit_file(&repo, "a.py", &format!("x = {i}\n"), 1_000 + i);
        }
        let delta = read_history(dir.path(), None, 3, &CancellationToken::new())
            .unwrap()
            .unwrap();
        assert_eq!(delta.commits.len(), 3);
    }
}
