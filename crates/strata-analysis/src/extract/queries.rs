//! Tree-sitter query patterns per language.
//!
//! Definition patterns capture `@<kind>.def` (the declaration node) and
//! `@<kind>.name` (its identifier). Reference patterns capture one of
//! `@call.name`, `@call.method` (with an optional `@call.receiver`),
//! `@import.name` (with an optional `@import.module`), `@inherit.name`
//! or `@type.name`.
//!
//! Patterns are kept one per entry and compiled independently, so a node
//! kind missing from a linked grammar version only drops that pattern.

use crate::scanner::language_detect::Language;

/// Definition and reference patterns of one grammar.
pub struct QuerySet {
    pub defs: &'static [&'static str],
    pub refs: &'static [&'static str],
}

/// Query set for a language with a dedicated grammar. Aliased languages
/// use the set of the language they alias onto.
pub fn query_set_for(lang: Language) -> &'static QuerySet {
    match lang.grammar_alias().unwrap_or(lang) {
        Language::TypeScript => &TYPESCRIPT,
        Language::JavaScript => &JAVASCRIPT,
        Language::Python => &PYTHON,
        Language::Java => &JAVA,
        Language::CSharp => &CSHARP,
        Language::Go => &GO,
        Language::Rust => &RUST,
        Language::Ruby => &RUBY,
        Language::Php => &PHP,
        Language::Kotlin => &KOTLIN,
        // grammar_alias never maps onto another alias
        Language::Cpp | Language::C => &CSHARP,
        Language::Swift | Language::Scala => &JAVA,
    }
}

// ---- TypeScript ----

static TYPESCRIPT: QuerySet = QuerySet {
    defs: &[
        "(function_declaration name: (identifier) @function.name) @function.def",
        "(generator_function_declaration name: (identifier) @function.name) @function.def",
        "(method_definition name: (property_identifier) @method.name) @method.def",
        "(class_declaration name: (type_identifier) @class.name) @class.def",
        "(abstract_class_declaration name: (type_identifier) @class.name) @class.def",
        "(interface_declaration name: (type_identifier) @interface.name) @interface.def",
        "(type_alias_declaration name: (type_identifier) @type_alias.name) @type_alias.def",
        "(enum_declaration name: (identifier) @enum.name) @enum.def",
        "(lexical_declaration (variable_declarator name: (identifier) @function.name value: (arrow_function))) @function.def",
        "(lexical_declaration (variable_declarator name: (identifier) @function.name value: (function_expression))) @function.def",
    ],
    refs: &[
        "(call_expression function: (identifier) @call.name)",
        "(call_expression function: (member_expression object: (identifier) @call.receiver property: (property_identifier) @call.method))",
        "(call_expression function: (member_expression property: (property_identifier) @call.method))",
        "(new_expression constructor: (identifier) @call.name)",
        "(import_statement (import_clause (named_imports (import_specifier name: (identifier) @import.name))) source: (string) @import.module)",
        "(import_statement (import_clause (identifier) @import.name) source: (string) @import.module)",
        "(class_heritage (extends_clause value: (identifier) @inherit.name))",
        "(class_heritage (implements_clause (type_identifier) @inherit.name))",
        "(extends_type_clause (type_identifier) @inherit.name)",
        "(type_annotation (type_identifier) @type.name)",
    ],
};

// ---- JavaScript ----

static JAVASCRIPT: QuerySet = QuerySet {
    defs: &[
        "(function_declaration name: (identifier) @function.name) @function.def",
        "(generator_function_declaration name: (identifier) @function.name) @function.def",
        "(method_definition name: (property_identifier) @method.name) @method.def",
        "(class_declaration name: (identifier) @class.name) @class.def",
        "(lexical_declaration (variable_declarator name: (identifier) @function.name value: (arrow_function))) @function.def",
        "(lexical_declaration (variable_declarator name: (identifier) @function.name value: (function_expression))) @function.def",
    ],
    refs: &[
        "(call_expression function: (identifier) @call.name)",
        "(call_expression function: (member_expression object: (identifier) @call.receiver property: (property_identifier) @call.method))",
        "(call_expression function: (member_expression property: (property_identifier) @call.method))",
        "(new_expression constructor: (identifier) @call.name)",
        "(import_statement (import_clause (named_imports (import_specifier name: (identifier) @import.name))) source: (string) @import.module)",
        "(import_statement (import_clause (identifier) @import.name) source: (string) @import.module)",
        "(class_heritage (identifier) @inherit.name)",
    ],
};

// ---- Python ----

static PYTHON: QuerySet = QuerySet {
    defs: &[
        "(function_definition name: (identifier) @function.name) @function.def",
        "(class_definition name: (identifier) @class.name) @class.def",
    ],
    refs: &[
        "(call function: (identifier) @call.name)",
        "(call function: (attribute object: (identifier) @call.receiver attribute: (identifier) @call.method))",
        "(call function: (attribute attribute: (identifier) @call.method))",
        "(import_statement name: (dotted_name) @import.name)",
        "(import_statement name: (aliased_import name: (dotted_name) @import.name))",
        "(import_from_statement module_name: (dotted_name) @import.module name: (dotted_name) @import.name)",
        "(import_from_statement module_name: (dotted_name) @import.module name: (aliased_import name: (dotted_name) @import.name))",
        "(class_definition superclasses: (argument_list (identifier) @inherit.name))",
        "(class_definition superclasses: (argument_list (attribute attribute: (identifier) @inherit.name)))",
        "(typed_parameter type: (type (identifier) @type.name))",
        "(function_definition return_type: (type (identifier) @type.name))",
    ],
};

// ---- Java ----

static JAVA: QuerySet = QuerySet {
    defs: &[
        "(method_declaration name: (identifier) @method.name) @method.def",
        "(constructor_declaration name: (identifier) @constructor.name) @constructor.def",
        "(class_declaration name: (identifier) @class.name) @class.def",
        "(interface_declaration name: (identifier) @interface.name) @interface.def",
        "(enum_declaration name: (identifier) @enum.name) @enum.def",
        "(record_declaration name: (identifier) @class.name) @class.def",
    ],
    refs: &[
        "(method_invocation name: (identifier) @call.name)",
        "(method_invocation object: (identifier) @call.receiver name: (identifier) @call.method)",
        "(object_creation_expression type: (type_identifier) @call.name)",
        "(import_declaration (scoped_identifier) @import.name)",
        "(superclass (type_identifier) @inherit.name)",
        "(super_interfaces (type_list (type_identifier) @inherit.name))",
        "(formal_parameter type: (type_identifier) @type.name)",
    ],
};

// ---- C# ----

static CSHARP: QuerySet = QuerySet {
    defs: &[
        "(method_declaration name: (identifier) @method.name) @method.def",
        "(constructor_declaration name: (identifier) @constructor.name) @constructor.def",
        "(class_declaration name: (identifier) @class.name) @class.def",
        "(interface_declaration name: (identifier) @interface.name) @interface.def",
        "(struct_declaration name: (identifier) @struct.name) @struct.def",
        "(enum_declaration name: (identifier) @enum.name) @enum.def",
        "(record_declaration name: (identifier) @class.name) @class.def",
    ],
    refs: &[
        "(invocation_expression function: (identifier) @call.name)",
        "(invocation_expression function: (member_access_expression expression: (identifier) @call.receiver name: (identifier) @call.method))",
        "(invocation_expression function: (member_access_expression name: (identifier) @call.method))",
        "(object_creation_expression type: (identifier) @call.name)",
        "(using_directive (identifier) @import.name)",
        "(using_directive (qualified_name) @import.name)",
        "(base_list (identifier) @inherit.name)",
        "(parameter type: (identifier) @type.name)",
    ],
};

// ---- Go ----

static GO: QuerySet = QuerySet {
    defs: &[
        "(function_declaration name: (identifier) @function.name) @function.def",
        "(method_declaration name: (field_identifier) @method.name) @method.def",
        "(type_spec name: (type_identifier) @struct.name type: (struct_type)) @struct.def",
        "(type_spec name: (type_identifier) @interface.name type: (interface_type)) @interface.def",
        "(type_alias name: (type_identifier) @type_alias.name) @type_alias.def",
    ],
    refs: &[
        "(call_expression function: (identifier) @call.name)",
        "(call_expression function: (selector_expression operand: (identifier) @call.receiver field: (field_identifier) @call.method))",
        "(import_spec path: (interpreted_string_literal) @import.name)",
        "(composite_literal type: (type_identifier) @call.name)",
        "(parameter_declaration type: (type_identifier) @type.name)",
        "(parameter_declaration type: (pointer_type (type_identifier) @type.name))",
    ],
};

// ---- Rust ----

static RUST: QuerySet = QuerySet {
    defs: &[
        "(function_item name: (identifier) @function.name) @function.def",
        "(function_signature_item name: (identifier) @function.name) @function.def",
        "(struct_item name: (type_identifier) @struct.name) @struct.def",
        "(enum_item name: (type_identifier) @enum.name) @enum.def",
        "(trait_item name: (type_identifier) @trait.name) @trait.def",
        "(impl_item type: (type_identifier) @impl.name) @impl.def",
        "(mod_item name: (identifier) @namespace.name) @namespace.def",
        "(type_item name: (type_identifier) @type_alias.name) @type_alias.def",
    ],
    refs: &[
        "(call_expression function: (identifier) @call.name)",
        "(call_expression function: (scoped_identifier path: (identifier) @call.receiver name: (identifier) @call.method))",
        "(call_expression function: (field_expression field: (field_identifier) @call.method))",
        "(use_declaration argument: (scoped_identifier path: (_) @import.module name: (identifier) @import.name))",
        "(use_declaration argument: (identifier) @import.name)",
        "(scoped_use_list path: (_) @import.module list: (use_list (identifier) @import.name))",
        "(impl_item trait: (type_identifier) @inherit.name)",
        "(struct_expression name: (type_identifier) @call.name)",
        "(parameter type: (type_identifier) @type.name)",
        "(function_item return_type: (type_identifier) @type.name)",
    ],
};

// ---- Ruby ----

static RUBY: QuerySet = QuerySet {
    defs: &[
        "(method name: (identifier) @method.name) @method.def",
        "(singleton_method name: (identifier) @method.name) @method.def",
        "(class name: (constant) @class.name) @class.def",
        "(module name: (constant) @namespace.name) @namespace.def",
    ],
    refs: &[
        "(call receiver: (identifier) @call.receiver method: (identifier) @call.method)",
        "(call receiver: (constant) @call.receiver method: (identifier) @call.method)",
        "(call method: (identifier) @call.method)",
        "(superclass (constant) @inherit.name)",
    ],
};

// ---- PHP ----

static PHP: QuerySet = QuerySet {
    defs: &[
        "(function_definition name: (name) @function.name) @function.def",
        "(method_declaration name: (name) @method.name) @method.def",
        "(class_declaration name: (name) @class.name) @class.def",
        "(interface_declaration name: (name) @interface.name) @interface.def",
        "(trait_declaration name: (name) @trait.name) @trait.def",
        "(enum_declaration name: (name) @enum.name) @enum.def",
    ],
    refs: &[
        "(function_call_expression function: (name) @call.name)",
        "(member_call_expression name: (name) @call.method)",
        "(scoped_call_expression scope: (name) @call.receiver name: (name) @call.method)",
        "(object_creation_expression (name) @call.name)",
        "(namespace_use_clause (qualified_name) @import.name)",
        "(base_clause (name) @inherit.name)",
        "(class_interface_clause (name) @inherit.name)",
    ],
};

// ---- Kotlin ----

static KOTLIN: QuerySet = QuerySet {
    defs: &[
        "(function_declaration (simple_identifier) @function.name) @function.def",
        "(class_declaration (type_identifier) @class.name) @class.def",
        "(object_declaration (type_identifier) @object.name) @object.def",
    ],
    refs: &[
        "(call_expression (simple_identifier) @call.name)",
        "(call_expression (navigation_expression (simple_identifier) @call.receiver (navigation_suffix (simple_identifier) @call.method)))",
        "(import_header (identifier) @import.name)",
        "(delegation_specifier (user_type (type_identifier) @inherit.name))",
        "(delegation_specifier (constructor_invocation (user_type (type_identifier) @inherit.name)))",
    ],
};
