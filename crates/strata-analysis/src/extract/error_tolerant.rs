//! Error-tolerant parsing: count ERROR and MISSING nodes so partially
//! broken files keep the symbols that did parse.

use tree_sitter::Node;

/// Count ERROR and MISSING nodes under `root`.
pub fn count_errors(root: Node) -> u32 {
    if !root.has_error() {
        return 0;
    }
    let mut count = 0u32;
    let mut cursor = root.walk();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            count += 1;
        }
        if node.has_error() {
            stack.extend(node.children(&mut cursor));
        }
    }
    count
}
