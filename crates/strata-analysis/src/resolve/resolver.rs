//! Four-tier reference resolver.
//!
//! Tiers, first match wins:
//! 1. exported symbol in the same file,
//! 2. symbol with the exact name in the same directory. A private match
//!    in the referencing file itself wins outright; otherwise exported
//!    candidates are preferred over private ones,
//! 3. exported symbol anywhere in the project,
//! 4. cross-language bridges.
//!
//! Within a tier, a qualifier naming a candidate's file stem narrows the
//! candidates. Remaining ties resolve to the first candidate in
//! (path, ordinal) order and are flagged ambiguous, with the runner-up
//! kept as the alternative target.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use strata_core::types::collections::SmallVec4;
use strata_storage::queries::edges::EdgeRecord;
use strata_storage::queries::refs::RefRecord;

use super::bridges::{Bridge, BridgeQuery};
use super::diagnostics::ResolutionDiagnostics;
use super::index::{dir_of, SymbolIndex};
use crate::extract::types::RefKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    SameFile,
    SameDirectory,
    ProjectUnique,
    Bridge,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::SameFile => "same_file",
            Tier::SameDirectory => "same_dir",
            Tier::ProjectUnique => "project",
            Tier::Bridge => "bridge",
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            Tier::SameFile => 1.0,
            Tier::SameDirectory => 0.9,
            Tier::ProjectUnique => 0.8,
            Tier::Bridge => 0.6,
        }
    }
}

/// The chosen target of one reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub target: u32,
    pub alt: Option<u32>,
    pub tier: Tier,
    pub ambiguous: bool,
}

impl Resolution {
    pub fn confidence(&self) -> f64 {
        let base = self.tier.confidence();
        if self.ambiguous {
            base / 2.0
        } else {
            base
        }
    }
}

/// A file whose cached references are being resolved.
#[derive(Debug, Clone, Copy)]
pub struct ReferencingFile<'a> {
    pub file_id: i64,
    pub path: &'a str,
    pub language: Option<&'a str>,
    /// Content hash of the referencing file version.
    pub provenance: &'a str,
    pub refs: &'a [RefRecord],
}

/// Edges produced for a set of referencing files.
#[derive(Debug, Default)]
pub struct ResolveOutput {
    pub edges: Vec<EdgeRecord>,
    pub diagnostics: ResolutionDiagnostics,
}

pub struct Resolver<'a> {
    index: &'a SymbolIndex,
    bridges: &'a [Box<dyn Bridge>],
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a SymbolIndex, bridges: &'a [Box<dyn Bridge>]) -> Self {
        Self { index, bridges }
    }

    /// Resolve one reference made from `from_path`.
    pub fn resolve(
        &self,
        name: &str,
        qualifier: Option<&str>,
        from_file_id: i64,
        from_path: &str,
        language: Option<&str>,
    ) -> Option<Resolution> {
        let named = self.index.named(name);
        if !named.is_empty() {
            let same_file: SmallVec4<u32> = named
                .iter()
                .copied()
                .filter(|&i| {
                    let e = self.index.entry(i);
                    e.exported && self.index.file_of(i).file_id == from_file_id
                })
                .collect();
            if let Some(r) = self.pick(same_file, qualifier, Tier::SameFile) {
                return Some(r);
            }

            let dir = dir_of(from_path);
            let same_dir: SmallVec4<u32> = named
                .iter()
                .copied()
                .filter(|&i| self.index.file_of(i).dir == dir)
                .collect();
            let same_dir = self.prefer_local(same_dir, from_file_id);
            if let Some(r) = self.pick(same_dir, qualifier, Tier::SameDirectory) {
                return Some(r);
            }

            let exported: SmallVec4<u32> = named
                .iter()
                .copied()
                .filter(|&i| self.index.entry(i).exported)
                .collect();
            if let Some(r) = self.pick(exported, qualifier, Tier::ProjectUnique) {
                return Some(r);
            }
        }

        let query = BridgeQuery {
            name,
            qualifier,
            language,
        };
        self.bridges.iter().find_map(|bridge| {
            let found = bridge.candidates(&query, self.index);
            self.pick(found, qualifier, Tier::Bridge)
        })
    }

    /// Narrow same-directory candidates: ones declared in the referencing
    /// file first, then exported ones. Falls back to the full list.
    fn prefer_local(&self, candidates: SmallVec4<u32>, from_file_id: i64) -> SmallVec4<u32> {
        let own: SmallVec4<u32> = candidates
            .iter()
            .copied()
            .filter(|&i| self.index.file_of(i).file_id == from_file_id)
            .collect();
        if !own.is_empty() {
            return own;
        }
        let exported: SmallVec4<u32> = candidates
            .iter()
            .copied()
            .filter(|&i| self.index.entry(i).exported)
            .collect();
        if exported.is_empty() {
            candidates
        } else {
            exported
        }
    }

    fn pick(&self, candidates: SmallVec4<u32>, qualifier: Option<&str>, tier: Tier) -> Option<Resolution> {
        if candidates.is_empty() {
            return None;
        }
        let narrowed: SmallVec4<u32> = match qualifier {
            Some(q) => candidates
                .iter()
                .copied()
                .filter(|&i| self.index.file_of(i).stem == q)
                .collect(),
            None => SmallVec4::new(),
        };
        let list = if narrowed.is_empty() { &candidates } else { &narrowed };
        Some(Resolution {
            target: list[0],
            alt: list.get(1).copied(),
            tier,
            ambiguous: list.len() > 1,
        })
    }

    /// Resolve every cached reference of `files` into edges.
    ///
    /// Files are visited in path order and references in ordinal order, so
    /// the first occurrence of an (source, target, kind) triple sets the
    /// edge's line.
    pub fn resolve_files(&self, files: &[ReferencingFile<'_>]) -> ResolveOutput {
        let mut ordered: Vec<&ReferencingFile<'_>> = files.iter().collect();
        ordered.sort_by(|a, b| a.path.cmp(b.path));

        let mut out = ResolveOutput::default();
        let mut seen: FxHashSet<(i64, i64, RefKind)> = FxHashSet::default();
        for file in ordered {
            let mut refs: Vec<&RefRecord> = file.refs.iter().collect();
            refs.sort_by_key(|r| r.ordinal);
            for r in refs {
                out.diagnostics.total += 1;
                let Some(kind) = RefKind::parse(&r.kind) else {
                    out.diagnostics.unresolved += 1;
                    continue;
                };
                let Some(res) = self.resolve(
                    &r.target_name,
                    r.qualifier.as_deref(),
                    file.file_id,
                    file.path,
                    file.language,
                ) else {
                    out.diagnostics.unresolved += 1;
                    continue;
                };
                out.diagnostics.resolved += 1;
                out.diagnostics.record_tier(res.tier);
                if res.ambiguous {
                    out.diagnostics.ambiguous += 1;
                }

                let target = self.index.entry(res.target);
                if target.id == r.source_id {
                    out.diagnostics.self_references += 1;
                    continue;
                }
                if !seen.insert((r.source_id, target.id, kind)) {
                    out.diagnostics.duplicates += 1;
                    continue;
                }
                out.edges.push(EdgeRecord {
                    source_id: r.source_id,
                    target_id: target.id,
                    kind: kind.as_str().to_string(),
                    source_file_id: file.file_id,
                    target_file_id: self.index.file_of(res.target).file_id,
                    tier: res.tier.as_str().to_string(),
                    confidence: res.confidence(),
                    ambiguous: res.ambiguous,
                    alt_target_id: res
                        .alt
                        .map(|a| self.index.entry(a).id)
                        .filter(|&alt| alt != r.source_id),
                    line: r.line,
                    provenance: file.provenance.to_string(),
                });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::bridges::default_bridges;
    use crate::resolve::index::indexed;
    use strata_core::types::FileId;

    fn resolve_from(index: &SymbolIndex, name: &str, qualifier: Option<&str>, path: &str) -> Option<(i64, Tier, bool)> {
        let bridges = default_bridges();
        let resolver = Resolver::new(index, &bridges);
        resolver
            .resolve(name, qualifier, FileId::derive(path).raw(), path, Some("python"))
            .map(|r| (index.entry(r.target).id, r.tier, r.ambiguous))
    }

    #[test]
    fn test_same_file_wins() {
        let index = SymbolIndex::build(&[
            indexed(1, "a.py", "python", "run", true),
            indexed(2, "main.py", "python", "run", true),
        ]);
        assert_eq!(resolve_from(&index, "run", None, "main.py"), Some((2, Tier::SameFile, false)));
    }

    #[test]
    fn test_same_directory_beats_project() {
        let index = SymbolIndex::build(&[
            indexed(1, "lib/run.py", "python", "run", true),
            indexed(2, "app/helpers.py", "python", "run", false),
        ]);
        assert_eq!(
            resolve_from(&index, "run", None, "app/main.py"),
            Some((2, Tier::SameDirectory, false))
        );
    }

    #[test]
    fn test_private_helper_in_own_file_beats_sibling() {
        let index = SymbolIndex::build(&[
            indexed(1, "src/a.py", "python", "_helper", false),
            indexed(2, "src/b.py", "python", "_helper", false),
        ]);
        assert_eq!(
            resolve_from(&index, "_helper", None, "src/b.py"),
            Some((2, Tier::SameDirectory, false))
        );
    }

    #[test]
    fn test_same_directory_prefers_exported() {
        let index = SymbolIndex::build(&[
            indexed(1, "app/a.py", "python", "load", false),
            indexed(2, "app/b.py", "python", "load", true),
        ]);
        assert_eq!(
            resolve_from(&index, "load", None, "app/main.py"),
            Some((2, Tier::SameDirectory, false))
        );
    }

    #[test]
    fn test_project_tie_is_first_path_and_ambiguous() {
        let index = SymbolIndex::build(&[
            indexed(1, "z/x.py", "python", "x", true),
            indexed(2, "y/x.py", "python", "x", true),
        ]);
        assert_eq!(
            resolve_from(&index, "x", None, "main.py"),
            Some((2, Tier::ProjectUnique, true))
        );
    }

    #[test]
    fn test_qualifier_prefers_matching_stem() {
        let index = SymbolIndex::build(&[
            indexed(1, "a/models.py", "python", "save", true),
            indexed(2, "b/store.py", "python", "save", true),
        ]);
        assert_eq!(
            resolve_from(&index, "save", Some("store"), "main.py"),
            Some((2, Tier::ProjectUnique, false))
        );
    }

    #[test]
    fn test_unexported_elsewhere_is_unresolved() {
        let index = SymbolIndex::build(&[indexed(1, "lib/a.py", "python", "_private", false)]);
        assert_eq!(resolve_from(&index, "_private", None, "main.py"), None);
    }

    #[test]
    fn test_resolve_files_dedups_and_skips_self() {
        let index = SymbolIndex::build(&[
            indexed(10, "a.py", "python", "foo", true),
            indexed(20, "b.py", "python", "bar", true),
        ]);
        let b_id = FileId::derive("b.py").raw();
        let refs = vec![
            RefRecord {
                file_id: b_id,
                ordinal: 0,
                source_id: 20,
                target_name: "foo".into(),
                qualifier: None,
                kind: "call".into(),
                line: 3,
            },
            RefRecord {
                file_id: b_id,
                ordinal: 1,
                source_id: 20,
                target_name: "foo".into(),
                qualifier: None,
                kind: "call".into(),
                line: 7,
            },
            RefRecord {
                file_id: b_id,
                ordinal: 2,
                source_id: 20,
                target_name: "bar".into(),
                qualifier: None,
                kind: "call".into(),
                line: 9,
            },
            RefRecord {
                file_id: b_id,
                ordinal: 3,
                source_id: 20,
                target_name: "nowhere".into(),
                qualifier: None,
                kind: "call".into(),
                line: 10,
            },
        ];
        let bridges = default_bridges();
        let out = Resolver::new(&index, &bridges).resolve_files(&[ReferencingFile {
            file_id: b_id,
            path: "b.py",
            language: Some("python"),
            provenance: "00000000000000ab",
            refs: &refs,
        }]);
        assert_eq!(out.edges.len(), 1);
        assert_eq!(out.edges[0].target_id, 10);
        assert_eq!(out.edges[0].line, 3);
        assert_eq!(out.edges[0].tier, "same_dir");
        assert!((out.edges[0].confidence - 0.9).abs() < 1e-12);
        assert_eq!(out.diagnostics.total, 4);
        assert_eq!(out.diagnostics.resolved, 3);
        assert_eq!(out.diagnostics.duplicates, 1);
        assert_eq!(out.diagnostics.self_references, 1);
        assert_eq!(out.diagnostics.unresolved, 1);
    }

    #[test]
    fn test_bridge_tier_confidence() {
        let index = SymbolIndex::build(&[indexed(1, "svc/users.go", "go", "GetUser", true)]);
        let bridges = default_bridges();
        let resolver = Resolver::new(&index, &bridges);
        let r = resolver
            .resolve("get_user", None, 99, "client/api.py", Some("python"))
            .unwrap();
        assert_eq!(r.tier, Tier::Bridge);
        assert!((r.confidence() - 0.6).abs() < 1e-12);
    }
}
