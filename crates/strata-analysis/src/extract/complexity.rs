//! Per-symbol cognitive complexity over the tree-sitter subtree of a
//! definition.
//!
//! Control-flow nodes score 1 plus a triangular nesting penalty
//! (depth 0, 1, 2, 3 add 1, 2, 4, 7) and open a nesting level.
//! Continuations (`elif`, `else`, `case`, match arms) and flow breaks score
//! a flat 1, as does every short-circuit boolean operator. A function or
//! lambda nested inside the body opens a nesting level without scoring.

use tree_sitter::Node;

/// Nodes that score with the nesting penalty and nest their children.
const NESTING: &[&str] = &[
    "if_statement",
    "if_expression",
    "for_statement",
    "for_in_statement",
    "for_expression",
    "enhanced_for_statement",
    "foreach_statement",
    "while_statement",
    "while_expression",
    "loop_expression",
    "do_statement",
    "switch_statement",
    "switch_expression",
    "expression_switch_statement",
    "type_switch_statement",
    "select_statement",
    "match_statement",
    "match_expression",
    "when_expression",
    "try_statement",
    "catch_clause",
    "except_clause",
    "with_statement",
    "conditional_expression",
    "ternary_expression",
    // ruby
    "if",
    "unless",
    "while",
    "until",
    "case",
];

/// Nodes that score a flat 1 and keep their parent's depth.
const CONTINUATION: &[&str] = &[
    "elif_clause",
    "else_clause",
    "case_clause",
    "switch_case",
    "match_arm",
    "elsif",
];

const FLOW_BREAK: &[&str] = &["break_statement", "continue_statement", "goto_statement"];

const NESTED_FUNCTION: &[&str] = &[
    "function_definition",
    "function_declaration",
    "method_definition",
    "method_declaration",
    "arrow_function",
    "lambda",
    "lambda_expression",
    "anonymous_function",
    "closure_expression",
    "function_expression",
    "func_literal",
];

const BOOLEAN_TOKENS: &[&str] = &["&&", "||", "and", "or", "??"];

fn is_boolean_op(node: Node) -> bool {
    match node.kind() {
        "boolean_operator" | "conjunction_expression" | "disjunction_expression" => true,
        "binary_expression" | "binary" => {
            let mut cursor = node.walk();
            let found = node
                .children(&mut cursor)
                .any(|c| !c.is_named() && BOOLEAN_TOKENS.contains(&c.kind()));
            found
        }
        _ => false,
    }
}

/// Cognitive complexity of the definition rooted at `def`.
pub fn cognitive_complexity(def: Node) -> u32 {
    let mut score = 0u32;
    let mut cursor = def.walk();
    let mut stack: Vec<(Node, u32)> = vec![(def, 0)];
    while let Some((node, depth)) = stack.pop() {
        // keyword tokens share their kind with the ruby statements
        if !node.is_named() {
            continue;
        }
        let kind = node.kind();
        let child_depth = if NESTING.contains(&kind) {
            score = score.saturating_add(1 + depth * (depth + 1) / 2);
            depth + 1
        } else if CONTINUATION.contains(&kind) {
            score = score.saturating_add(1);
            depth
        } else if FLOW_BREAK.contains(&kind) {
            score = score.saturating_add(1);
            continue;
        } else if is_boolean_op(node) {
            score = score.saturating_add(1);
            depth
        } else if depth > 0 && NESTED_FUNCTION.contains(&kind) {
            depth + 1
        } else {
            depth
        };
        stack.extend(node.children(&mut cursor).map(|c| (c, child_depth)));
    }
    score
}
