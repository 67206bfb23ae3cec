//! Property tests for the resolver: the chosen target of an ambiguous
//! reference must not depend on the order symbols were inserted in.

use proptest::prelude::*;
use strata_analysis::resolve::{Resolver, SymbolIndex, Tier};
use strata_core::types::{FileId, SymbolId};
use strata_storage::queries::symbols::IndexedSymbol;

fn symbol(path: &str, ordinal: u32, name: &str) -> IndexedSymbol {
    IndexedSymbol {
        id: SymbolId::derive(path, ordinal).raw(),
        file_id: FileId::derive(path).raw(),
        ordinal: i64::from(ordinal),
        path: path.to_string(),
        language: Some("python".to_string()),
        name: name.to_string(),
        qualified_name: name.to_string(),
        kind: "function".to_string(),
        is_exported: true,
        line_start: 1 + i64::from(ordinal),
        line_end: 1 + i64::from(ordinal),
    }
}

/// Two exported `handle` symbols in sibling packages plus unrelated filler.
fn symbols() -> Vec<IndexedSymbol> {
    let mut all = vec![symbol("a/x.py", 0, "handle"), symbol("b/x.py", 0, "handle")];
    for (i, path) in ["a/x.py", "b/x.py", "c/y.py", "d/z.py"].iter().enumerate() {
        all.push(symbol(path, 1, &format!("helper{i}")));
        all.push(symbol(path, 2, "setup"));
    }
    all
}

/// Private `helper` functions in three sibling files.
fn private_helpers() -> Vec<IndexedSymbol> {
    ["src/a.rs", "src/b.rs", "src/c.rs"]
        .iter()
        .flat_map(|path| {
            let mut private = symbol(path, 1, "helper");
            private.is_exported = false;
            private.language = Some("rust".to_string());
            [symbol(path, 0, "run"), private]
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn test_ambiguous_tie_breaks_by_path(shuffled in Just(symbols()).prop_shuffle()) {
        let index = SymbolIndex::build(&shuffled);
        let resolver = Resolver::new(&index, &[]);
        let from = "main.py";
        let res = resolver
            .resolve("handle", None, FileId::derive(from).raw(), from, Some("python"))
            .expect("exported candidates exist");

        prop_assert_eq!(res.tier, Tier::ProjectUnique);
        prop_assert!(res.ambiguous);
        prop_assert_eq!(index.entry(res.target).id, SymbolId::derive("a/x.py", 0).raw());
        let alt = res.alt.expect("runner-up kept");
        prop_assert_eq!(index.entry(alt).id, SymbolId::derive("b/x.py", 0).raw());
    }

    #[test]
    fn test_same_directory_beats_project(shuffled in Just(symbols()).prop_shuffle()) {
        let index = SymbolIndex::build(&shuffled);
        let resolver = Resolver::new(&index, &[]);
        let from = "b/main.py";
        let res = resolver
            .resolve("handle", None, FileId::derive(from).raw(), from, Some("python"))
            .expect("same-directory candidate exists");

        prop_assert_eq!(res.tier, Tier::SameDirectory);
        prop_assert!(!res.ambiguous);
        prop_assert_eq!(index.entry(res.target).id, SymbolId::derive("b/x.py", 0).raw());
    }

    #[test]
    fn test_private_helper_binds_to_own_file(shuffled in Just(private_helpers()).prop_shuffle()) {
        let index = SymbolIndex::build(&shuffled);
        let resolver = Resolver::new(&index, &[]);
        let from = "src/b.rs";
        let res = resolver
            .resolve("helper", None, FileId::derive(from).raw(), from, Some("rust"))
            .expect("own-file candidate exists");

        prop_assert_eq!(res.tier, Tier::SameDirectory);
        prop_assert!(!res.ambiguous);
        prop_assert_eq!(index.entry(res.target).id, SymbolId::derive("src/b.rs", 1).raw());
    }

    #[test]
    fn test_qualifier_narrows_by_file_stem(shuffled in Just(symbols()).prop_shuffle()) {
        let index = SymbolIndex::build(&shuffled);
        let resolver = Resolver::new(&index, &[]);
        let from = "main.py";
        let res = resolver
            .resolve("setup", Some("y"), FileId::derive(from).raw(), from, Some("python"))
            .expect("qualified candidate exists");

        prop_assert_eq!(res.tier, Tier::ProjectUnique);
        prop_assert!(!res.ambiguous);
        prop_assert_eq!(index.entry(res.target).id, SymbolId::derive("c/y.py", 2).raw());
    }
}
