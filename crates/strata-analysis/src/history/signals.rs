//! Per-file history signals: commits, churn, ownership and co-change entropy.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use strata_storage::queries::history::ChangeRow;

use crate::stats::normalized_entropy;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileSignals {
    pub commit_count: i64,
    pub churn: i64,
    pub distinct_authors: i64,
    pub top_owner: Option<String>,
    /// Share of the file's commits made by `top_owner`.
    pub owner_share: f64,
    pub cochange_entropy: f64,
}

#[derive(Default)]
struct Accumulator {
    commits: i64,
    churn: i64,
    authors: BTreeMap<String, i64>,
    partners: BTreeMap<String, f64>,
}

/// Signals for every live file in `live` (path → file id), computed from
/// recorded changes. Commits touching fewer than 2 or more than
/// `max_files_per_commit` files do not contribute co-change partners.
pub fn compute_signals(
    changes: &[ChangeRow],
    live: &FxHashMap<String, i64>,
    max_files_per_commit: usize,
) -> FxHashMap<i64, FileSignals> {
    let mut acc: FxHashMap<&str, Accumulator> = FxHashMap::default();

    let mut start = 0;
    while start < changes.len() {
        let hash = &changes[start].commit_hash;
        let end = start
            + changes[start..]
                .iter()
                .take_while(|c| &c.commit_hash == hash)
                .count();
        let commit = &changes[start..end];
        let file_count = commit[0].file_count.max(commit.len() as i64) as usize;
        let counts_for_cochange = (2..=max_files_per_commit).contains(&file_count);

        for change in commit {
            if !live.contains_key(&change.path) {
                continue;
            }
            let entry = acc.entry(change.path.as_str()).or_default();
            entry.commits += 1;
            entry.churn += change.lines_added + change.lines_removed;
            *entry.authors.entry(change.author.clone()).or_insert(0) += 1;
            if counts_for_cochange {
                for other in commit.iter().filter(|o| o.path != change.path) {
                    *entry.partners.entry(other.path.clone()).or_insert(0.0) += 1.0;
                }
            }
        }
        start = end;
    }

    acc.into_iter()
        .filter_map(|(path, a)| {
            let file_id = *live.get(path)?;
            // BTreeMap order makes the first maximum the smallest name.
            let owner = a
                .authors
                .iter()
                .fold(None::<(&String, i64)>, |best, (name, &n)| match best {
                    Some((_, m)) if m >= n => best,
                    _ => Some((name, n)),
                });
            let partner_counts: Vec<f64> = a.partners.values().copied().collect();
            Some((
                file_id,
                FileSignals {
                    commit_count: a.commits,
                    churn: a.churn,
                    distinct_authors: a.authors.len() as i64,
                    top_owner: owner.map(|(name, _)| name.clone()),
                    owner_share: owner.map_or(0.0, |(_, n)| n as f64 / a.commits as f64),
                    cochange_entropy: normalized_entropy(&partner_counts),
                },
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(hash: &str, author: &str, ts: i64, file_count: i64, path: &str, added: i64) -> ChangeRow {
        ChangeRow {
            commit_hash: hash.to_string(),
            author: author.to_string(),
            timestamp: ts,
            file_count,
            path: path.to_string(),
            lines_added: added,
            lines_removed: 1,
        }
    }

    fn live(paths: &[(&str, i64)]) -> FxHashMap<String, i64> {
        paths.iter().map(|(p, id)| (p.to_string(), *id)).collect()
    }

    #[test]
    fn test_counts_churn_and_owner() {
        let changes = vec![
            row("c1", "ann", 1, 1, "a.py", 5),
            row("c2", "bob", 2, 1, "a.py", 3),
            row("c3", "bob", 3, 1, "a.py", 2),
        ];
        let s = compute_signals(&changes, &live(&[("a.py", 1)]), 100);
        let a = &s[&1];
        assert_eq!(a.commit_count, 3);
        assert_eq!(a.churn, 13);
        assert_eq!(a.distinct_authors, 2);
        assert_eq!(a.top_owner.as_deref(), Some("bob"));
        assert!((a.owner_share - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(a.cochange_entropy, 0.0);
    }

    #[test]
    fn test_cochange_entropy_spreads_over_partners() {
        let changes = vec![
            row("c1", "ann", 1, 2, "a.py", 1),
            row("c1", "ann", 1, 2, "b.py", 1),
            row("c2", "ann", 2, 2, "a.py", 1),
            row("c2", "ann", 2, 2, "c.py", 1),
        ];
        let s = compute_signals(&changes, &live(&[("a.py", 1), ("b.py", 2), ("c.py", 3)]), 100);
        assert!((s[&1].cochange_entropy - 1.0).abs() < 1e-12);
        assert_eq!(s[&2].cochange_entropy, 0.0);
    }

    #[test]
    fn test_large_commits_do_not_count_as_cochange() {
        let changes = vec![
            row("c1", "ann", 1, 200, "a.py", 1),
            row("c1", "ann", 1, 200, "b.py", 1),
            row("c2", "ann", 2, 200, "a.py", 1),
            row("c2", "ann", 2, 200, "c.py", 1),
        ];
        let s = compute_signals(&changes, &live(&[("a.py", 1)]), 100);
        assert_eq!(s[&1].cochange_entropy, 0.0);
        assert_eq!(s[&1].commit_count, 2);
    }

    #[test]
    fn test_owner_tie_breaks_on_name() {
        let changes = vec![
            row("c1", "zed", 1, 1, "a.py", 1),
            row("c2", "amy", 2, 1, "a.py", 1),
        ];
        let s = compute_signals(&changes, &live(&[("a.py", 1)]), 100);
        assert_eq!(s[&1].top_owner.as_deref(), Some("amy"));
    }
}
