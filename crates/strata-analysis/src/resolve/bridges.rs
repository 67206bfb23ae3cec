//! Cross-language bridges: the last resolution tier.

use strata_core::types::collections::SmallVec4;

use super::index::SymbolIndex;

/// What a bridge sees of an unresolved reference.
#[derive(Debug, Clone, Copy)]
pub struct BridgeQuery<'a> {
    pub name: &'a str,
    pub qualifier: Option<&'a str>,
    pub language: Option<&'a str>,
}

/// Maps a reference onto definitions the direct tiers cannot see.
pub trait Bridge: Send + Sync {
    fn name(&self) -> &'static str;

    /// Candidate entries in preference order.
    fn candidates(&self, query: &BridgeQuery<'_>, index: &SymbolIndex) -> SmallVec4<u32>;

    /// Other names a reference to `name` could reach through this bridge.
    /// Used to widen the affected set when `name` is declared or removed.
    fn spellings(&self, name: &str) -> Vec<String>;
}

/// The bridges every index context starts with.
pub fn default_bridges() -> Vec<Box<dyn Bridge>> {
    vec![Box::new(NamingBridge), Box::new(ProtobufBridge)]
}

/// Split an identifier into lowercase words at `_`, `-` and case humps.
fn words(ident: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in ident.chars() {
        if c == '_' || c == '-' {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// snake_case, camelCase and PascalCase spellings of `ident`, excluding
/// `ident` itself.
pub fn case_variants(ident: &str) -> Vec<String> {
    let w = words(ident);
    if w.is_empty() {
        return Vec::new();
    }
    let snake = w.join("_");
    let pascal: String = w.iter().map(|p| capitalize(p)).collect();
    let camel: String = w
        .iter()
        .enumerate()
        .map(|(i, p)| if i == 0 { p.clone() } else { capitalize(p) })
        .collect();
    let mut out: Vec<String> = Vec::with_capacity(3);
    for v in [snake, camel, pascal] {
        if v != ident && !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

/// Matches the same concept spelled per language convention, e.g. a Python
/// `get_user` called from TypeScript as `getUser`.
pub struct NamingBridge;

impl Bridge for NamingBridge {
    fn name(&self) -> &'static str {
        "naming"
    }

    fn candidates(&self, query: &BridgeQuery<'_>, index: &SymbolIndex) -> SmallVec4<u32> {
        let mut out = SmallVec4::new();
        for variant in case_variants(query.name) {
            for &idx in index.named(&variant) {
                let entry = index.entry(idx);
                if !entry.exported {
                    continue;
                }
                let lang = index.file_of(idx).language.as_deref();
                if lang.is_some() && query.language.is_some() && lang != query.language {
                    out.push(idx);
                }
            }
        }
        sort_by_path(&mut out, index);
        out
    }

    fn spellings(&self, name: &str) -> Vec<String> {
        case_variants(name)
    }
}

const STUB_NAME_SUFFIXES: &[&str] = &["Stub", "Client", "Servicer", "Server"];

/// Maps generated RPC stub names onto their service definitions and plain
/// message names onto generated stub files.
pub struct ProtobufBridge;

impl Bridge for ProtobufBridge {
    fn name(&self) -> &'static str {
        "protobuf"
    }

    fn candidates(&self, query: &BridgeQuery<'_>, index: &SymbolIndex) -> SmallVec4<u32> {
        let mut out = SmallVec4::new();
        for suffix in STUB_NAME_SUFFIXES {
            if let Some(base) = query.name.strip_suffix(suffix) {
                if !base.is_empty() {
                    out.extend(index.named(base).iter().copied());
                }
            }
        }
        if out.is_empty() {
            out.extend(
                index
                    .named(query.name)
                    .iter()
                    .copied()
                    .filter(|&i| index.file_of(i).is_stub),
            );
        }
        sort_by_path(&mut out, index);
        out
    }

    fn spellings(&self, name: &str) -> Vec<String> {
        let mut out: Vec<String> = STUB_NAME_SUFFIXES.iter().map(|s| format!("{name}{s}")).collect();
        for suffix in STUB_NAME_SUFFIXES {
            if let Some(base) = name.strip_suffix(suffix) {
                if !base.is_empty() {
                    out.push(base.to_string());
                }
            }
        }
        out
    }
}

/// Stable order: path, then declaration order (index position).
fn sort_by_path(list: &mut SmallVec4<u32>, index: &SymbolIndex) {
    list.sort_by(|&a, &b| index.file_of(a).path.cmp(&index.file_of(b).path).then(a.cmp(&b)));
    list.dedup();
}
