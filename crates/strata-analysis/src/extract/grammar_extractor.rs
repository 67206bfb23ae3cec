//! Tree-sitter backed extractor shared by every built-in language.
//!
//! One instance per (language, grammar). Queries are compiled once at
//! registry construction and shared across threads; parsers are
//! thread-local because `tree_sitter::Parser` is not `Sync`.

use std::cell::RefCell;

use strata_core::errors::ParseError;
use tree_sitter::{Node, Parser, Query, QueryCursor, StreamingIterator, Tree};

use super::complexity::cognitive_complexity;
use super::error_tolerant::count_errors;
use super::exports::is_exported;
use super::queries::{query_set_for, QuerySet};
use super::traits::Extractor;
use super::types::{
    count_lines, module_stem, ExtractStatus, FileExtraction, RefCandidate, RefKind,
    SymbolCandidate, SymbolKind,
};
use crate::scanner::language_detect::Language;

thread_local! {
    static PARSER: RefCell<Parser> = RefCell::new(Parser::new());
}

/// What a capture contributes to a match.
#[derive(Debug, Clone, Copy)]
enum Role {
    DefNode(SymbolKind),
    DefName,
    RefName(RefKind),
    Qualifier,
}

struct Pattern {
    query: Query,
    roles: Vec<Option<Role>>,
}

/// Extractor driven by a [`QuerySet`] over one tree-sitter grammar.
pub struct GrammarExtractor {
    language: Language,
    extensions: Vec<&'static str>,
    tag: &'static str,
    grammar: tree_sitter::Language,
    defs: Vec<Pattern>,
    refs: Vec<Pattern>,
}

/// A definition before ordinals and parents are assigned.
struct RawDef {
    kind: SymbolKind,
    name: String,
    start_byte: usize,
    end_byte: usize,
    line_start: u32,
    line_end: u32,
    exported: bool,
    complexity: u32,
}

/// A reference before its enclosing symbol is known.
struct RawRef {
    kind: RefKind,
    name: String,
    qualifier: Option<String>,
    byte: usize,
    line: u32,
    column: u32,
}

impl GrammarExtractor {
    /// Extractor for `language` over its own grammar (or its alias target).
    pub fn new(language: Language) -> Self {
        Self::with_grammar(
            language,
            language.extensions().to_vec(),
            language.key(),
            language.ts_language(),
        )
    }

    /// Extractor with an explicit grammar and extension list. Used for TSX,
    /// which shares the TypeScript query set but not its grammar.
    pub fn with_grammar(
        language: Language,
        extensions: Vec<&'static str>,
        tag: &'static str,
        grammar: tree_sitter::Language,
    ) -> Self {
        let set = query_set_for(language);
        let defs = compile_patterns(tag, &grammar, set, true);
        let refs = compile_patterns(tag, &grammar, set, false);
        tracing::debug!(
            language = tag,
            def_patterns = defs.len(),
            ref_patterns = refs.len(),
            "extractor ready"
        );
        Self {
            language,
            extensions,
            tag,
            grammar,
            defs,
            refs,
        }
    }

    /// Number of patterns that compiled against the linked grammar.
    pub fn pattern_count(&self) -> usize {
        self.defs.len() + self.refs.len()
    }

    fn parse(&self, source: &[u8], path: &str) -> Result<Tree, ParseError> {
        PARSER.with(|cell| {
            let mut parser = cell.borrow_mut();
            parser
                .set_language(&self.grammar)
                .map_err(|e| ParseError::GrammarRejected {
                    language: self.tag.to_string(),
                    message: e.to_string(),
                })?;
            parser.parse(source, None).ok_or_else(|| ParseError::NoTree {
                path: path.to_string(),
            })
        })
    }

    fn collect_defs(&self, root: Node, source: &[u8]) -> Vec<RawDef> {
        let mut out = Vec::new();
        for pattern in &self.defs {
            let mut cursor = QueryCursor::new();
            let mut matches = cursor.matches(&pattern.query, root, source);
            while let Some(m) = matches.next() {
                let mut def: Option<(SymbolKind, Node)> = None;
                let mut name: Option<Node> = None;
                for capture in m.captures {
                    match pattern.roles[capture.index as usize] {
                        Some(Role::DefNode(kind)) => def = Some((kind, capture.node)),
                        Some(Role::DefName) => name = Some(capture.node),
                        _ => {}
                    }
                }
                let (Some((kind, node)), Some(name_node)) = (def, name) else {
                    continue;
                };
                let Ok(text) = name_node.utf8_text(source) else {
                    continue;
                };
                out.push(RawDef {
                    kind,
                    name: text.to_string(),
                    start_byte: node.start_byte(),
                    end_byte: node.end_byte(),
                    line_start: node.start_position().row as u32 + 1,
                    line_end: node.end_position().row as u32 + 1,
                    exported: is_exported(self.language, node, text, source),
                    complexity: match kind {
                        SymbolKind::Function | SymbolKind::Method => cognitive_complexity(node),
                        _ => 0,
                    },
                });
            }
        }
        out
    }

    fn collect_refs(&self, root: Node, source: &[u8]) -> Vec<RawRef> {
        let mut out = Vec::new();
        for pattern in &self.refs {
            let mut cursor = QueryCursor::new();
            let mut matches = cursor.matches(&pattern.query, root, source);
            while let Some(m) = matches.next() {
                let mut target: Option<(RefKind, Node)> = None;
                let mut qualifier: Option<Node> = None;
                for capture in m.captures {
                    match pattern.roles[capture.index as usize] {
                        Some(Role::RefName(kind)) => target = Some((kind, capture.node)),
                        Some(Role::Qualifier) => qualifier = Some(capture.node),
                        _ => {}
                    }
                }
                let Some((kind, node)) = target else {
                    continue;
                };
                let Ok(raw) = node.utf8_text(source) else {
                    continue;
                };
                let explicit = qualifier
                    .and_then(|q| q.utf8_text(source).ok())
                    .and_then(qualifier_stem);
                let Some((name, implied)) = split_target(raw) else {
                    continue;
                };
                let pos = node.start_position();
                out.push(RawRef {
                    kind,
                    name,
                    qualifier: explicit.or(implied),
                    byte: node.start_byte(),
                    line: pos.row as u32 + 1,
                    column: pos.column as u32,
                });
            }
        }
        out
    }
}

impl Extractor for GrammarExtractor {
    fn language(&self) -> Language {
        self.language
    }

    fn extensions(&self) -> &[&'static str] {
        &self.extensions
    }

    fn grammar_tag(&self) -> &'static str {
        self.tag
    }

    fn extract(&self, source: &[u8], path: &str) -> Result<FileExtraction, ParseError> {
        let line_count = count_lines(source);
        let tree = self.parse(source, path)?;
        let root = tree.root_node();
        let status = match count_errors(root) {
            0 => ExtractStatus::Parsed,
            n => ExtractStatus::Partial { error_nodes: n },
        };

        let mut symbols = build_symbols(self.collect_defs(root, source));
        let refs = attach_refs(
            self.collect_refs(root, source),
            &mut symbols,
            path,
            line_count,
            source.len(),
        );

        Ok(FileExtraction {
            language: Some(self.language),
            symbols,
            refs,
            status,
            line_count,
        })
    }
}

fn compile_patterns(
    tag: &str,
    grammar: &tree_sitter::Language,
    set: &QuerySet,
    definitions: bool,
) -> Vec<Pattern> {
    let sources = if definitions { set.defs } else { set.refs };
    let mut compiled = Vec::with_capacity(sources.len());
    for src in sources {
        let query = match Query::new(grammar, src) {
            Ok(q) => q,
            Err(e) => {
                tracing::warn!(language = tag, pattern = *src, error = %e, "query pattern skipped");
                continue;
            }
        };
        let roles = query
            .capture_names()
            .iter()
            .map(|name| capture_role(name, definitions))
            .collect();
        compiled.push(Pattern { query, roles });
    }
    compiled
}

fn capture_role(name: &str, definitions: bool) -> Option<Role> {
    let (prefix, suffix) = name.split_once('.')?;
    if definitions {
        match suffix {
            "def" => SymbolKind::from_capture(prefix).map(Role::DefNode),
            "name" => Some(Role::DefName),
            _ => None,
        }
    } else {
        match suffix {
            "name" | "method" => RefKind::from_capture(prefix).map(Role::RefName),
            "receiver" | "module" => Some(Role::Qualifier),
            _ => None,
        }
    }
}

/// Sort, deduplicate and nest raw definitions into ordered candidates.
fn build_symbols(mut raw: Vec<RawDef>) -> Vec<SymbolCandidate> {
    raw.sort_by(|a, b| {
        a.start_byte
            .cmp(&b.start_byte)
            .then(b.end_byte.cmp(&a.end_byte))
            .then(a.kind.cmp(&b.kind))
            .then(a.name.cmp(&b.name))
    });
    raw.dedup_by(|b, a| a.start_byte == b.start_byte && a.end_byte == b.end_byte && a.name == b.name);

    let mut symbols: Vec<SymbolCandidate> = Vec::with_capacity(raw.len());
    // Ordinals of the open enclosing definitions, outermost first.
    let mut open: Vec<u32> = Vec::new();
    for def in raw {
        while let Some(&top) = open.last() {
            let t = &symbols[top as usize];
            if t.end_byte >= def.end_byte && t.start_byte <= def.start_byte && t.end_byte > def.start_byte {
                break;
            }
            open.pop();
        }
        let parent = open.last().copied();
        let (kind, qualified_name) = match parent {
            Some(p) => {
                let ps = &symbols[p as usize];
                let kind = if def.kind == SymbolKind::Function && ps.kind.is_class_like() {
                    SymbolKind::Method
                } else {
                    def.kind
                };
                (kind, format!("{}.{}", ps.qualified_name, def.name))
            }
            None => (def.kind, def.name.clone()),
        };
        let ordinal = symbols.len() as u32;
        symbols.push(SymbolCandidate {
            name: def.name,
            qualified_name,
            kind,
            exported: def.exported,
            parent,
            line_start: def.line_start,
            line_end: def.line_end,
            start_byte: def.start_byte,
            end_byte: def.end_byte,
            complexity: def.complexity,
        });
        open.push(ordinal);
    }
    symbols
}

/// Innermost symbol whose span contains `byte`.
fn enclosing(symbols: &[SymbolCandidate], byte: usize) -> Option<u32> {
    let idx = symbols.partition_point(|s| s.start_byte <= byte);
    let mut current = idx.checked_sub(1).map(|i| i as u32);
    while let Some(i) = current {
        let s = &symbols[i as usize];
        if s.start_byte <= byte && byte < s.end_byte {
            return Some(i);
        }
        current = s.parent;
    }
    None
}

/// Assign each reference its enclosing symbol, appending the module
/// symbol when any reference sits outside every declaration.
fn attach_refs(
    raw: Vec<RawRef>,
    symbols: &mut Vec<SymbolCandidate>,
    path: &str,
    line_count: u32,
    source_len: usize,
) -> Vec<RefCandidate> {
    let mut module: Option<u32> = None;
    let mut refs = Vec::with_capacity(raw.len());
    for r in raw {
        let source = match enclosing(symbols, r.byte) {
            Some(s) => s,
            None => *module.get_or_insert(symbols.len() as u32),
        };
        refs.push(RefCandidate {
            source,
            target_name: r.name,
            qualifier: r.qualifier,
            kind: r.kind,
            line: r.line,
            column: r.column,
        });
    }
    if module.is_some() {
        let stem = module_stem(path).to_string();
        symbols.push(SymbolCandidate {
            name: stem.clone(),
            qualified_name: stem,
            kind: SymbolKind::Module,
            exported: false,
            parent: None,
            line_start: 1,
            line_end: line_count.max(1),
            start_byte: 0,
            end_byte: source_len,
            complexity: 0,
        });
    }

    refs.sort_by(|a, b| {
        (a.line, a.column, a.kind, &a.target_name).cmp(&(b.line, b.column, b.kind, &b.target_name))
    });
    refs.dedup_by(|later, kept| {
        let same = later.line == kept.line
            && later.column == kept.column
            && later.kind == kept.kind
            && later.target_name == kept.target_name;
        if same && kept.qualifier.is_none() {
            kept.qualifier = later.qualifier.take();
        }
        same
    });
    refs
}

/// Split a captured target into (name, implied qualifier).
///
/// `"./lib/a"` becomes `("a", None)`, `a.b.c` becomes `("c", Some("b"))`
/// and `std::fs::read` becomes `("read", Some("fs"))`.
fn split_target(raw: &str) -> Option<(String, Option<String>)> {
    let text = unquote(raw);
    let text = match text.rfind(['/', '\\']) {
        Some(i) => module_stem(&text[i + 1..]),
        None => text,
    };
    let mut parts: Vec<&str> = text
        .split(|c| c == '.' || c == ':')
        .filter(|p| !p.is_empty())
        .collect();
    let name = parts.pop()?.trim();
    if name.is_empty() {
        return None;
    }
    let qualifier = parts.pop().map(str::to_string);
    Some((name.to_string(), qualifier))
}

/// Reduce a receiver or module capture to the file stem it names.
fn qualifier_stem(raw: &str) -> Option<String> {
    let text = unquote(raw);
    let last = match text.rfind(['/', '\\']) {
        Some(i) => module_stem(&text[i + 1..]),
        None => text
            .rsplit(|c| c == '.' || c == ':')
            .find(|p| !p.is_empty())
            .unwrap_or(""),
    };
    let last = last.trim();
    if last.is_empty() {
        None
    } else {
        Some(last.to_string())
    }
}

fn unquote(raw: &str) -> &str {
    raw.trim().trim_matches(|c| c == '"' || c == '\'' || c == '`')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python() -> GrammarExtractor {
        GrammarExtractor::new(Language::Python)
    }

    #[test]
    fn test_all_python_patterns_compile() {
        let ex = python();
        let set = query_set_for(Language::Python);
        assert_eq!(ex.pattern_count(), set.defs.len() + set.refs.len());
    }

    #[test]
    fn test_python_definition_only_file() {
        let out = python().extract(b"def foo():\n    pass\n", "a.py").unwrap();
        assert_eq!(out.status, ExtractStatus::Parsed);
        assert_eq!(out.symbols.len(), 1);
        assert_eq!(out.symbols[0].name, "foo");
        assert_eq!(out.symbols[0].kind, SymbolKind::Function);
        assert!(out.symbols[0].exported);
        assert!(out.refs.is_empty());
    }

    #[test]
    fn test_top_level_refs_get_module_symbol() {
        let out = python().extract(b"import a\na.foo()\n", "pkg/b.py").unwrap();
        assert_eq!(out.symbols.len(), 1);
        let module = &out.symbols[0];
        assert_eq!(module.kind, SymbolKind::Module);
        assert_eq!(module.name, "b");
        assert!(!module.exported);

        let call = out.refs.iter().find(|r| r.kind == RefKind::Call).unwrap();
        assert_eq!(call.target_name, "foo");
        assert_eq!(call.qualifier.as_deref(), Some("a"));
        assert_eq!(call.source, 0);
        assert_eq!(out.refs.iter().filter(|r| r.kind == RefKind::Call).count(), 1);

        let import = out.refs.iter().find(|r| r.kind == RefKind::Import).unwrap();
        assert_eq!(import.target_name, "a");
    }

    #[test]
    fn test_file_without_declarations_or_refs_is_empty() {
        let out = python().extract(b"VALUE = 42\n", "c.py").unwrap();
        assert!(out.symbols.is_empty());
        assert!(out.refs.is_empty());
        assert_eq!(out.line_count, 1);
    }

    #[test]
    fn test_methods_nest_under_classes() {
        let src = b"class Greeter:\n    def hello(self):\n        helper()\n\ndef helper():\n    pass\n";
        let out = python().extract(src, "g.py").unwrap();
        let names: Vec<&str> = out.symbols.iter().map(|s| s.qualified_name.as_str()).collect();
        assert_eq!(names, vec!["Greeter", "Greeter.hello", "helper"]);
        assert_eq!(out.symbols[1].kind, SymbolKind::Method);
        assert_eq!(out.symbols[1].parent, Some(0));
        let call = out.refs.iter().find(|r| r.target_name == "helper").unwrap();
        assert_eq!(call.source, 1);
    }

    #[test]
    fn test_underscore_names_are_private() {
        let out = python().extract(b"def _hidden():\n    pass\n", "p.py").unwrap();
        assert!(!out.symbols[0].exported);
    }

    #[test]
    fn test_from_import_carries_module() {
        let out = python().extract(b"from pkg.util import parse\n", "m.py").unwrap();
        let import = &out.refs[0];
        assert_eq!(import.target_name, "parse");
        assert_eq!(import.qualifier.as_deref(), Some("util"));
    }

    #[test]
    fn test_broken_source_is_partial() {
        let out = python().extract(b"def ok():\n    pass\n\ndef broken(:\n", "x.py").unwrap();
        assert!(matches!(out.status, ExtractStatus::Partial { .. }));
        assert!(out.symbols.iter().any(|s| s.name == "ok"));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let src = b"class A:\n    def f(self):\n        g()\n        self.h()\n\ndef g():\n    A().f()\n";
        let first = python().extract(src, "d.py").unwrap();
        for _ in 0..5 {
            assert_eq!(python().extract(src, "d.py").unwrap(), first);
        }
    }

    #[test]
    fn test_split_target() {
        assert_eq!(split_target("\"./lib/a\""), Some(("a".to_string(), None)));
        assert_eq!(
            split_target("a.b.c"),
            Some(("c".to_string(), Some("b".to_string())))
        );
        assert_eq!(
            split_target("std::fs::read"),
            Some(("read".to_string(), Some("fs".to_string())))
        );
        assert_eq!(split_target("\"\""), None);
    }

    #[test]
    fn test_qualifier_stem() {
        assert_eq!(qualifier_stem("'../models/user.js'").as_deref(), Some("user"));
        assert_eq!(qualifier_stem("pkg.util").as_deref(), Some("util"));
        assert_eq!(qualifier_stem("self").as_deref(), Some("self"));
    }
}
