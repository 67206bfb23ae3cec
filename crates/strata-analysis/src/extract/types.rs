//! Extraction output types: symbol and reference candidates per file.

use serde::{Deserialize, Serialize};

use crate::scanner::language_detect::Language;

/// Kind of a declared symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Class,
    Interface,
    Struct,
    Enum,
    Trait,
    Impl,
    Object,
    Namespace,
    TypeAlias,
    Constructor,
    Method,
    Function,
    /// Synthetic whole-file symbol that owns top-level references.
    Module,
}

impl SymbolKind {
    /// Map the `<kind>` prefix of a definition capture.
    pub fn from_capture(prefix: &str) -> Option<SymbolKind> {
        Some(match prefix {
            "class" => SymbolKind::Class,
            "interface" => SymbolKind::Interface,
            "struct" => SymbolKind::Struct,
            "enum" => SymbolKind::Enum,
            "trait" => SymbolKind::Trait,
            "impl" => SymbolKind::Impl,
            "object" => SymbolKind::Object,
            "namespace" => SymbolKind::Namespace,
            "type_alias" => SymbolKind::TypeAlias,
            "constructor" => SymbolKind::Constructor,
            "method" => SymbolKind::Method,
            "function" => SymbolKind::Function,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Struct => "struct",
            SymbolKind::Enum => "enum",
            SymbolKind::Trait => "trait",
            SymbolKind::Impl => "impl",
            SymbolKind::Object => "object",
            SymbolKind::Namespace => "namespace",
            SymbolKind::TypeAlias => "type_alias",
            SymbolKind::Constructor => "constructor",
            SymbolKind::Method => "method",
            SymbolKind::Function => "function",
            SymbolKind::Module => "module",
        }
    }

    /// Kinds whose nested functions are methods.
    pub fn is_class_like(&self) -> bool {
        matches!(
            self,
            SymbolKind::Class
                | SymbolKind::Interface
                | SymbolKind::Struct
                | SymbolKind::Enum
                | SymbolKind::Trait
                | SymbolKind::Impl
                | SymbolKind::Object
        )
    }
}

/// Kind of an unresolved reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    Call,
    Import,
    Inherit,
    TypeRef,
}

impl RefKind {
    pub fn from_capture(prefix: &str) -> Option<RefKind> {
        Some(match prefix {
            "call" => RefKind::Call,
            "import" => RefKind::Import,
            "inherit" => RefKind::Inherit,
            "type" => RefKind::TypeRef,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RefKind::Call => "call",
            RefKind::Import => "import",
            RefKind::Inherit => "inherit",
            RefKind::TypeRef => "type_ref",
        }
    }

    pub fn parse(s: &str) -> Option<RefKind> {
        Some(match s {
            "call" => RefKind::Call,
            "import" => RefKind::Import,
            "inherit" => RefKind::Inherit,
            "type_ref" => RefKind::TypeRef,
            _ => return None,
        })
    }
}

/// A declared symbol. Its ordinal is its index in [`FileExtraction::symbols`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolCandidate {
    pub name: String,
    pub qualified_name: String,
    pub kind: SymbolKind,
    pub exported: bool,
    /// Ordinal of the innermost enclosing symbol.
    pub parent: Option<u32>,
    /// 1-based, inclusive.
    pub line_start: u32,
    pub line_end: u32,
    pub start_byte: usize,
    pub end_byte: usize,
    /// Cognitive complexity of a function or method body, 0 otherwise.
    #[serde(default)]
    pub complexity: u32,
}

/// An unresolved use of a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefCandidate {
    /// Ordinal of the enclosing symbol (possibly the module symbol).
    pub source: u32,
    pub target_name: String,
    /// Receiver or module the name was reached through (`a` in `a.foo()`).
    pub qualifier: Option<String>,
    pub kind: RefKind,
    pub line: u32,
    pub column: u32,
}

/// Per-file extraction outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractStatus {
    Parsed,
    /// The tree contains ERROR or MISSING nodes; symbols found are kept.
    Partial { error_nodes: u32 },
    /// No tree was produced. The file contributes zero symbols.
    Failed { reason: String },
    /// No extractor is registered for the file's extension.
    Unsupported,
}

impl ExtractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractStatus::Parsed => "parsed",
            ExtractStatus::Partial { .. } => "partial",
            ExtractStatus::Failed { .. } => "failed",
            ExtractStatus::Unsupported => "unsupported",
        }
    }

    pub fn error_nodes(&self) -> u32 {
        match self {
            ExtractStatus::Partial { error_nodes } => *error_nodes,
            _ => 0,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ExtractStatus::Failed { .. })
    }
}

/// Everything extracted from one file version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileExtraction {
    pub language: Option<Language>,
    pub symbols: Vec<SymbolCandidate>,
    pub refs: Vec<RefCandidate>,
    pub status: ExtractStatus,
    pub line_count: u32,
}

impl FileExtraction {
    /// Result for a file no extractor handles.
    pub fn unsupported(language: Option<Language>, line_count: u32) -> Self {
        Self {
            language,
            symbols: Vec::new(),
            refs: Vec::new(),
            status: ExtractStatus::Unsupported,
            line_count,
        }
    }

    /// Result for a file the parser could not handle at all.
    pub fn failed(language: Option<Language>, line_count: u32, reason: impl Into<String>) -> Self {
        Self {
            language,
            symbols: Vec::new(),
            refs: Vec::new(),
            status: ExtractStatus::Failed {
                reason: reason.into(),
            },
            line_count,
        }
    }

    /// Rename the module symbol for `path`. The rest of an extraction only
    /// depends on content, so cached results can be shared between files.
    pub fn rebind_module(&mut self, path: &str) {
        let stem = module_stem(path);
        for sym in self.symbols.iter_mut().filter(|s| s.kind == SymbolKind::Module) {
            sym.name = stem.to_string();
            sym.qualified_name = stem.to_string();
        }
    }
}

/// File stem used to name module symbols and to match receivers.
pub fn module_stem(path: &str) -> &str {
    let base = path.rsplit('/').next().unwrap_or(path);
    match base.find('.') {
        Some(0) | None => base,
        Some(i) => &base[..i],
    }
}

/// Count lines the way editors do: a trailing newline does not open a line.
pub fn count_lines(source: &[u8]) -> u32 {
    if source.is_empty() {
        return 0;
    }
    let newlines = source.iter().filter(|&&b| b == b'\n').count();
    let trailing = usize::from(source.last() != Some(&b'\n'));
    (newlines + trailing) as u32
}
