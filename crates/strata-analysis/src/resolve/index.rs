//! In-memory symbol index for resolution.
//!
//! Symbols are ordered by (path, ordinal) on build, so every candidate
//! list is already in tie-break order whatever order the caller used.

use lasso::Spur;
use rustc_hash::FxHashMap;
use strata_core::types::collections::SmallVec4;
use strata_core::types::interning::{FrozenNames, NameInterner};
use strata_storage::queries::symbols::IndexedSymbol;

use crate::extract::types::module_stem;

/// Suffixes of generated RPC stub files.
const STUB_SUFFIXES: &[&str] = &[
    "_pb2.py",
    "_pb2_grpc.py",
    ".pb.go",
    "_grpc.pb.go",
    "_pb.js",
    "_pb.ts",
    "_grpc_pb.js",
    "_grpc_pb.ts",
    ".g.cs",
    "_pb.rb",
];

pub fn is_stub_file(path: &str) -> bool {
    STUB_SUFFIXES.iter().any(|s| path.ends_with(s))
}

/// A file that declares at least one live symbol.
#[derive(Debug, Clone)]
pub struct IndexedFile {
    pub file_id: i64,
    pub path: String,
    pub dir: String,
    pub stem: String,
    pub language: Option<String>,
    pub is_stub: bool,
}

/// A symbol as the resolver sees it.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub id: i64,
    /// Position in [`SymbolIndex::files`].
    pub file: u32,
    pub name: Spur,
    pub kind: String,
    pub exported: bool,
}

/// Name-keyed lookup over every live symbol.
pub struct SymbolIndex {
    names: FrozenNames,
    files: Vec<IndexedFile>,
    entries: Vec<IndexEntry>,
    by_name: FxHashMap<Spur, SmallVec4<u32>>,
}

/// Directory part of a forward-slash path ("" at the root).
pub fn dir_of(path: &str) -> &str {
    path.rsplit_once('/').map(|(d, _)| d).unwrap_or("")
}

impl SymbolIndex {
    pub fn build(symbols: &[IndexedSymbol]) -> Self {
        let mut ordered: Vec<&IndexedSymbol> = symbols.iter().collect();
        ordered.sort_by(|a, b| a.path.cmp(&b.path).then(a.ordinal.cmp(&b.ordinal)));

        let names = NameInterner::new();
        let mut files: Vec<IndexedFile> = Vec::new();
        let mut by_file_id: FxHashMap<i64, u32> = FxHashMap::default();
        let mut entries = Vec::with_capacity(symbols.len());
        let mut by_name: FxHashMap<Spur, SmallVec4<u32>> = FxHashMap::default();

        for sym in ordered {
            let file = *by_file_id.entry(sym.file_id).or_insert_with(|| {
                files.push(IndexedFile {
                    file_id: sym.file_id,
                    path: sym.path.clone(),
                    dir: dir_of(&sym.path).to_string(),
                    stem: module_stem(&sym.path).to_string(),
                    language: sym.language.clone(),
                    is_stub: is_stub_file(&sym.path),
                });
                (files.len() - 1) as u32
            });
            let name = names.intern(&sym.name);
            let idx = entries.len() as u32;
            entries.push(IndexEntry {
                id: sym.id,
                file,
                name,
                kind: sym.kind.clone(),
                exported: sym.is_exported,
            });
            by_name.entry(name).or_default().push(idx);
        }

        Self {
            names: names.freeze(),
            files,
            entries,
            by_name,
        }
    }

    /// Entries named `name`, in (path, ordinal) order.
    pub fn named(&self, name: &str) -> &[u32] {
        self.names
            .get(name)
            .and_then(|spur| self.by_name.get(&spur))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn entry(&self, idx: u32) -> &IndexEntry {
        &self.entries[idx as usize]
    }

    pub fn file_of(&self, idx: u32) -> &IndexedFile {
        &self.files[self.entries[idx as usize].file as usize]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn distinct_names(&self) -> usize {
        self.names.len()
    }
}

#[cfg(test)]
pub(crate) fn indexed(id: i64, path: &str, lang: &str, name: &str, exported: bool) -> IndexedSymbol {
    use strata_core::types::FileId;
    IndexedSymbol {
        id,
        file_id: FileId::derive(path).raw(),
        ordinal: id,
        path: path.to_string(),
        language: Some(lang.to_string()),
        name: name.to_string(),
        qualified_name: name.to_string(),
        kind: "function".to_string(),
        is_exported: exported,
        line_start: 1,
        line_end: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_orders_by_path() {
        let symbols = vec![
            indexed(2, "b.py", "python", "run", true),
            indexed(3, "b.py", "python", "stop", true),
            indexed(1, "a.py", "python", "run", true),
        ];
        let index = SymbolIndex::build(&symbols);
        let ids: Vec<i64> = index.named("run").iter().map(|&i| index.entry(i).id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(index.named("missing").is_empty());
        assert_eq!(index.distinct_names(), 2);
    }

    #[test]
    fn test_file_metadata() {
        let index = SymbolIndex::build(&[indexed(1, "proto/user_pb2.py", "python", "User", true)]);
        let f = index.file_of(0);
        assert_eq!(f.dir, "proto");
        assert_eq!(f.stem, "user_pb2");
        assert!(f.is_stub);
        assert_eq!(dir_of("top.py"), "");
    }
}
