//! Tests for identifiers, interning and collections.

use strata_core::types::collections::{FxHashMap, FxHashSet};
use strata_core::types::interning::{normalize_path, NameInterner};
use strata_core::types::{FileId, SymbolId};

#[test]
fn test_file_id_is_stable_and_non_negative() {
    let a = FileId::derive("src/a.py");
    let again = FileId::derive("src/a.py");
    assert_eq!(a, again);
    assert!(a.raw() >= 0);
    assert_ne!(a, FileId::derive("src/b.py"));
}

#[test]
fn test_symbol_id_depends_on_path_and_ordinal() {
    let first = SymbolId::derive("a.py", 0);
    let second = SymbolId::derive("a.py", 1);
    let other_file = SymbolId::derive("b.py", 0);
    assert_ne!(first, second);
    assert_ne!(first, other_file);
    assert_eq!(first, SymbolId::derive("a.py", 0));
}

#[test]
fn test_symbol_id_separator_prevents_concatenation_collisions() {
    // "a.py1" + ordinal 2 vs "a.py" + ordinal 12
    assert_ne!(SymbolId::derive("a.py1", 2), SymbolId::derive("a.py", 12));
}

#[test]
fn test_ids_are_distinct_types() {
    let file = FileId::new(5);
    let symbol = SymbolId::new(5);
    assert_eq!(file.raw(), symbol.raw());
    let mut files: FxHashSet<FileId> = FxHashSet::default();
    files.insert(file);
    assert!(files.contains(&FileId::from(5)));
}

#[test]
fn test_name_interner_dedups() {
    let interner = NameInterner::new();
    let a = interner.intern("foo");
    let b = interner.intern("foo");
    let c = interner.intern("bar");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(interner.resolve(&a), "foo");
    assert_eq!(interner.len(), 2);
    assert!(interner.get("baz").is_none());
}

#[test]
fn test_concurrent_interning() {
    let interner = std::sync::Arc::new(NameInterner::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let interner = std::sync::Arc::clone(&interner);
            std::thread::spawn(move || interner.intern("shared_name"))
        })
        .collect();
    let keys: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(keys.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(interner.len(), 1);
}

#[test]
fn test_normalize_path() {
    assert_eq!(normalize_path("src\\lib\\mod.rs"), "src/lib/mod.rs");
    assert_eq!(normalize_path("./src//a.py"), "src/a.py");
    assert_eq!(normalize_path("pkg/"), "pkg");
    assert_eq!(normalize_path("/"), "/");
    assert_eq!(normalize_path("././lib/./x.rs"), "lib/./x.rs");
}

#[test]
fn test_reader_after_freeze() {
    let interner = NameInterner::new();
    let key = interner.intern("frozen");
    let frozen = interner.freeze();
    assert_eq!(frozen.resolve(&key), "frozen");
    assert_eq!(frozen.get("frozen"), Some(key));
    assert!(frozen.get("thawed").is_none());
}

#[test]
fn test_fxhashmap_with_ids() {
    let mut map: FxHashMap<SymbolId, &str> = FxHashMap::default();
    map.insert(SymbolId::derive("a.py", 0), "foo");
    assert_eq!(map.get(&SymbolId::derive("a.py", 0)), Some(&"foo"));
}
