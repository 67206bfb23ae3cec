//! Extension-based language detection.

use serde::{Deserialize, Serialize};

/// Languages the indexer recognises. Every variant has an extractor; the
/// ones without a dedicated grammar borrow one through
/// [`Language::grammar_alias`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
    Java,
    CSharp,
    Go,
    Rust,
    Ruby,
    Php,
    Kotlin,
    Cpp,
    C,
    Swift,
    Scala,
}

struct Entry {
    language: Language,
    key: &'static str,
    display: &'static str,
    extensions: &'static [&'static str],
}

/// One row per language, in the order `Language::all` reports them.
static TABLE: [Entry; 14] = [
    Entry { language: Language::TypeScript, key: "typescript", display: "TypeScript", extensions: &["ts", "tsx", "mts", "cts"] },
    Entry { language: Language::JavaScript, key: "javascript", display: "JavaScript", extensions: &["js", "jsx", "mjs", "cjs"] },
    Entry { language: Language::Python, key: "python", display: "Python", extensions: &["py", "pyi"] },
    Entry { language: Language::Java, key: "java", display: "Java", extensions: &["java"] },
    Entry { language: Language::CSharp, key: "csharp", display: "C#", extensions: &["cs"] },
    Entry { language: Language::Go, key: "go", display: "Go", extensions: &["go"] },
    Entry { language: Language::Rust, key: "rust", display: "Rust", extensions: &["rs"] },
    Entry { language: Language::Ruby, key: "ruby", display: "Ruby", extensions: &["rb", "rake", "gemspec"] },
    Entry { language: Language::Php, key: "php", display: "PHP", extensions: &["php"] },
    Entry { language: Language::Kotlin, key: "kotlin", display: "Kotlin", extensions: &["kt", "kts"] },
    Entry { language: Language::Cpp, key: "cpp", display: "C++", extensions: &["cpp", "cc", "cxx", "hpp", "hxx", "hh"] },
    Entry { language: Language::C, key: "c", display: "C", extensions: &["c", "h"] },
    Entry { language: Language::Swift, key: "swift", display: "Swift", extensions: &["swift"] },
    Entry { language: Language::Scala, key: "scala", display: "Scala", extensions: &["scala", "sc"] },
];

static ALL: [Language; 14] = [
    Language::TypeScript,
    Language::JavaScript,
    Language::Python,
    Language::Java,
    Language::CSharp,
    Language::Go,
    Language::Rust,
    Language::Ruby,
    Language::Php,
    Language::Kotlin,
    Language::Cpp,
    Language::C,
    Language::Swift,
    Language::Scala,
];

impl Language {
    fn entry(self) -> &'static Entry {
        // TABLE and the enum share declaration order
        &TABLE[self as usize]
    }

    /// Language for a file extension (without the dot). Case-sensitive:
    /// `.H` and `.PY` are not recognised.
    pub fn from_extension(ext: Option<&str>) -> Option<Language> {
        let ext = ext?;
        TABLE
            .iter()
            .find(|e| e.extensions.contains(&ext))
            .map(|e| e.language)
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        self.entry().extensions
    }

    /// Lowercase key stored in `files.language` and used as the grammar tag.
    pub fn key(&self) -> &'static str {
        self.entry().key
    }

    pub fn from_key(key: &str) -> Option<Language> {
        TABLE.iter().find(|e| e.key == key).map(|e| e.language)
    }

    pub fn all() -> &'static [Language] {
        &ALL
    }

    /// Language whose grammar and query set this one borrows.
    pub fn grammar_alias(&self) -> Option<Language> {
        match self {
            Language::Cpp | Language::C => Some(Language::CSharp),
            Language::Swift | Language::Scala => Some(Language::Java),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.entry().display
    }

    /// Tree-sitter grammar the extractor parses this language with.
    /// `.tsx` files get their own extractor over `LANGUAGE_TSX`.
    pub fn ts_language(&self) -> tree_sitter::Language {
        match self.grammar_alias().unwrap_or(*self) {
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            Language::Java => tree_sitter_java::LANGUAGE.into(),
            Language::Go => tree_sitter_go::LANGUAGE.into(),
            Language::Rust => tree_sitter_rust::LANGUAGE.into(),
            Language::Ruby => tree_sitter_ruby::LANGUAGE.into(),
            Language::Php => tree_sitter_php::LANGUAGE_PHP.into(),
            Language::Kotlin => tree_sitter_kotlin_sg::LANGUAGE.into(),
            Language::CSharp | Language::Cpp | Language::C => tree_sitter_c_sharp::LANGUAGE.into(),
            Language::Swift | Language::Scala => tree_sitter_java::LANGUAGE.into(),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
