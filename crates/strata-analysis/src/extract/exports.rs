//! Per-language export rules.

use tree_sitter::Node;

use crate::scanner::language_detect::Language;

/// Whether the declaration `def` named `name` is visible outside its file.
pub fn is_exported(lang: Language, def: Node, name: &str, source: &[u8]) -> bool {
    match lang {
        Language::Python | Language::Ruby => !name.starts_with('_'),
        Language::Go => name.chars().next().is_some_and(char::is_uppercase),
        Language::TypeScript | Language::JavaScript => has_ancestor(def, "export_statement"),
        Language::Rust => modifier_text(def, source)
            .iter()
            .any(|m| m.starts_with("pub")),
        Language::Php => {
            let mods = modifier_text(def, source);
            // PHP members default to public when no visibility is written.
            mods.is_empty() || mods.iter().any(|m| m.contains("public"))
        }
        Language::Kotlin => !modifier_text(def, source)
            .iter()
            .any(|m| m.contains("private") || m.contains("internal")),
        Language::Java
        | Language::CSharp
        | Language::Cpp
        | Language::C
        | Language::Swift
        | Language::Scala => modifier_text(def, source)
            .iter()
            .any(|m| m.contains("public")),
    }
}

fn has_ancestor(node: Node, kind: &str) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.kind() == kind {
            return true;
        }
        current = parent.parent();
    }
    false
}

/// Text of the visibility or modifier children of a declaration.
fn modifier_text<'s>(def: Node, source: &'s [u8]) -> Vec<&'s str> {
    let mut cursor = def.walk();
    def.children(&mut cursor)
        .filter(|c| {
            matches!(
                c.kind(),
                "modifiers" | "modifier" | "visibility_modifier"
            )
        })
        .filter_map(|c| c.utf8_text(source).ok())
        .collect()
}
